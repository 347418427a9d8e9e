//! MTN MoMo webhook handler.
//!
//! Production MoMo charges settle asynchronously: the gateway calls back with
//! the final status of a payment. Callbacks are signed with HMAC-SHA256 over
//! the raw body, hex-encoded in the `X-Momo-Signature` header.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use wipay_core::UserId;
use wipay_store::Store;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};
use crate::error::ApiError;
use crate::state::AppState;

/// MoMo payment callback payload.
#[derive(Debug, Deserialize)]
pub struct MomoCallback {
    /// The operator account the charge was made for.
    pub user_id: String,
    /// Final charge status ("SUCCESSFUL" or "FAILED").
    pub status: String,
    /// Gateway transaction reference, present on success.
    #[serde(rename = "financialTransactionId", default)]
    pub financial_transaction_id: Option<String>,
    /// Failure reason, present on failure.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle MoMo payment callbacks.
pub async fn momo_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    // Verify signature if a webhook secret is configured
    if let Some(secret) = &state.config.momo_webhook_secret {
        let signature = headers
            .get("x-momo-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("Missing MoMo signature".into()))?;

        let expected = hmac_sha256_hex(secret, &body);
        if !constant_time_eq(signature, &expected) {
            tracing::warn!("Invalid MoMo webhook signature");
            return Err(ApiError::BadRequest("Invalid webhook signature".into()));
        }
    } else {
        // No secret configured - skip verification (development mode)
        tracing::warn!("MoMo webhook secret not configured - skipping signature verification");
    }

    let callback: MomoCallback =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user_id = callback
        .user_id
        .parse::<UserId>()
        .map_err(|_| ApiError::BadRequest("invalid user_id in callback".into()))?;

    tracing::info!(
        user_id = %user_id,
        status = %callback.status,
        "Received MoMo webhook"
    );

    let mut profile = state
        .store
        .get_payment_profile(&user_id)?
        .ok_or_else(|| ApiError::NotFound("Payment profile not found".into()))?;

    match callback.status.as_str() {
        "SUCCESSFUL" => {
            profile.record_success(Utc::now());
            profile.is_verified = true;
            state.store.put_payment_profile(&profile)?;

            tracing::info!(
                user_id = %user_id,
                reference = ?callback.financial_transaction_id,
                "MoMo payment confirmed"
            );
        }
        "FAILED" => {
            profile.record_failure();
            state.store.put_payment_profile(&profile)?;

            tracing::warn!(
                user_id = %user_id,
                reason = ?callback.reason,
                failed_attempts = %profile.total_failed_attempts,
                "MoMo payment failed"
            );
        }
        other => {
            tracing::debug!(status = %other, "Unhandled MoMo callback status");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}
