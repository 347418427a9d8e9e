//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - operator authentication via HS256 JWT
//! - `AdminUser` - admin authentication via a `role: "admin"` JWT claim
//!
//! Admin access is an explicit claim in the signed token; nothing about the
//! account itself (email, name) grants admin rights.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use wipay_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims carried by Wipay bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Role, if any ("admin" grants admin endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    pub iat: i64,
}

/// An authenticated operator extracted from a JWT bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The operator account ID.
    pub user_id: UserId,
    /// The raw subject claim from the JWT.
    pub subject: String,
    /// The role claim, if present.
    pub role: Option<String>,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            subject: claims.sub,
            role: claims.role,
        })
    }
}

/// An authenticated admin.
///
/// Requires a valid JWT whose `role` claim is exactly `"admin"`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// The admin's account ID (for audit logging).
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;

        if claims.role.as_deref() != Some("admin") {
            return Err(ApiError::Forbidden);
        }

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthorized)?;

        tracing::info!(admin_id = %user_id, "Admin authenticated");

        Ok(AdminUser { user_id })
    }
}

/// Extract and validate the bearer token from request headers.
fn claims_from_parts(parts: &Parts, state: &AppState) -> Result<JwtClaims, ApiError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    validate_jwt(token, &state.config.jwt_secret)
}

/// Validate an HS256 JWT and return its claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<JwtClaims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(secret.as_bytes());

    let token_data = decode::<JwtClaims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}
