//! Voucher issuance and lifecycle handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use wipay_core::{
    normalize_number, PaymentMethod, SmsDelivery, Token, TokenDuration, TokenId,
};
use wipay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for voucher listings.
const DEFAULT_PAGE_LIMIT: usize = 50;

/// Maximum page size for voucher listings.
const MAX_PAGE_LIMIT: usize = 200;

/// Voucher issuance request.
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    /// Buyer phone number (normalized to +211 format).
    pub recipient_phone: String,
    /// Voucher duration in hours (1, 3, 6, 12, or 24).
    pub duration_hours: u32,
    /// How the buyer paid.
    pub payment_method: PaymentMethod,
}

/// A voucher in API responses.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Voucher ID.
    pub id: String,
    /// Buyer phone number.
    pub recipient_phone: String,
    /// Duration in hours.
    pub duration_hours: u32,
    /// Sale price in SSP.
    pub price: i64,
    /// Currency code.
    pub currency: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Lifecycle status.
    pub status: String,
    /// WiFi username.
    pub username: String,
    /// WiFi password.
    pub password: String,
    /// Whether the voucher currently grants access.
    pub is_active: bool,
    /// Issuance timestamp.
    pub created_at: String,
    /// Expiry timestamp.
    pub expires_at: String,
    /// Credentials SMS resend count.
    pub sms_resend_count: u32,
}

impl From<&Token> for TokenResponse {
    fn from(token: &Token) -> Self {
        Self {
            id: token.id.to_string(),
            recipient_phone: token.recipient_phone.clone(),
            duration_hours: token.duration.hours(),
            price: token.price,
            currency: token.currency.clone(),
            payment_method: token.payment_method,
            status: format!("{:?}", token.status).to_lowercase(),
            username: token.credentials.username.clone(),
            password: token.credentials.password.clone(),
            is_active: token.is_active,
            created_at: token.created_at.to_rfc3339(),
            expires_at: token.expires_at.to_rfc3339(),
            sms_resend_count: token.sms_resend_count,
        }
    }
}

/// Issuance response: the voucher plus delivery and quota information.
#[derive(Debug, Serialize)]
pub struct IssueTokenResponse {
    /// The issued voucher.
    pub token: TokenResponse,
    /// Whether the credentials SMS was sent (real or simulated).
    pub sms_delivered: bool,
    /// Whether delivery was simulated (plan without real SMS, or no gateway).
    pub sms_simulated: bool,
    /// Delivery warning when the voucher was issued but the SMS failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Remaining monthly allowance after this issuance (-1 when unlimited).
    pub tokens_remaining: i64,
}

/// Issue a new WiFi voucher.
///
/// The hotspot SSID must be configured first. The monthly quota is checked
/// and incremented inside the store write, so concurrent issuances cannot
/// race past the limit. A voucher whose SMS delivery fails is still issued;
/// the response carries the credentials and a warning instead of rolling
/// back the sale.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let duration = TokenDuration::try_from(body.duration_hours)?;
    let recipient_phone = normalize_number(&body.recipient_phone)
        .map_err(|e| ApiError::BadRequest(format!("invalid recipient phone: {e}")))?;

    // Issuing without a configured network would produce vouchers the buyer
    // cannot use.
    let network = state
        .store
        .get_hotspot_config(&auth.user_id)?
        .ok_or(ApiError::NetworkNotConfigured)?;

    let mut token = Token::issue(
        auth.user_id,
        recipient_phone,
        duration,
        body.payment_method,
        &state.config.pricing,
    )?;

    // Quota check + usage increment + voucher write, atomically.
    let subscription = state.store.issue_token(&token)?;

    let message = token.sms_message(&network.ssid);
    let (sms_delivered, sms_simulated, warning) =
        match subscription.plan.sms_delivery() {
            SmsDelivery::Real => match &state.sms {
                Some(sms) => match sms.send(&token.recipient_phone, &message).await {
                    Ok(()) => (true, false, None),
                    Err(e) => {
                        tracing::warn!(
                            token_id = %token.id,
                            error = %e,
                            "Voucher issued but SMS delivery failed"
                        );
                        (
                            false,
                            false,
                            Some(format!(
                                "voucher issued but SMS delivery failed: {e}; share the credentials manually"
                            )),
                        )
                    }
                },
                None => {
                    tracing::info!(token_id = %token.id, "SMS gateway not configured - simulated delivery");
                    (true, true, None)
                }
            },
            SmsDelivery::Simulated => {
                tracing::info!(
                    token_id = %token.id,
                    recipient = %token.recipient_phone,
                    "Simulated SMS delivery (plan)"
                );
                (true, true, None)
            }
        };

    if sms_delivered {
        token.record_sms_sent(Utc::now());
        state.store.update_token(&token)?;
    }

    tracing::info!(
        user_id = %auth.user_id,
        token_id = %token.id,
        duration_hours = %duration.hours(),
        price = %token.price,
        "Voucher issued"
    );

    Ok(Json(IssueTokenResponse {
        token: TokenResponse::from(&token),
        sms_delivered,
        sms_simulated,
        warning,
        tokens_remaining: i64::from(subscription.remaining_tokens()),
    }))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTokensQuery {
    /// Page size (default 50, max 200).
    pub limit: Option<usize>,
    /// Entries to skip.
    pub offset: Option<usize>,
}

/// Voucher listing response.
#[derive(Debug, Serialize)]
pub struct ListTokensResponse {
    /// Vouchers, newest first.
    pub tokens: Vec<TokenResponse>,
}

/// List the operator's vouchers, newest first.
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTokensQuery>,
) -> Result<Json<ListTokensResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let tokens = state.store.list_tokens_by_user(&auth.user_id, limit, offset)?;

    Ok(Json(ListTokensResponse {
        tokens: tokens.iter().map(TokenResponse::from).collect(),
    }))
}

/// Deactivate a voucher.
///
/// Deactivation is permanent and persisted: the voucher stops granting
/// access and its status moves to expired.
pub async fn deactivate_token(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut token = owned_token(&state, &auth, &id)?;

    token.deactivate();
    state.store.update_token(&token)?;

    tracing::info!(user_id = %auth.user_id, token_id = %token.id, "Voucher deactivated");

    Ok(Json(TokenResponse::from(&token)))
}

/// SMS resend response.
#[derive(Debug, Serialize)]
pub struct ResendSmsResponse {
    /// The voucher after the resend was recorded.
    pub token: TokenResponse,
    /// Whether delivery was simulated.
    pub sms_simulated: bool,
}

/// Re-send the credentials SMS for a voucher.
pub async fn resend_sms(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResendSmsResponse>, ApiError> {
    let mut token = owned_token(&state, &auth, &id)?;

    if !token.is_active {
        return Err(ApiError::Conflict("voucher is no longer active".into()));
    }

    let network = state
        .store
        .get_hotspot_config(&auth.user_id)?
        .ok_or(ApiError::NetworkNotConfigured)?;
    let subscription = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    let message = token.sms_message(&network.ssid);
    let sms_simulated = match subscription.plan.sms_delivery() {
        SmsDelivery::Real => match &state.sms {
            Some(sms) => {
                sms.send(&token.recipient_phone, &message)
                    .await
                    .map_err(|e| ApiError::ExternalService(e.to_string()))?;
                false
            }
            None => true,
        },
        SmsDelivery::Simulated => true,
    };

    token.record_sms_sent(Utc::now());
    state.store.update_token(&token)?;

    tracing::info!(
        user_id = %auth.user_id,
        token_id = %token.id,
        resend_count = %token.sms_resend_count,
        "Credentials SMS re-sent"
    );

    Ok(Json(ResendSmsResponse {
        token: TokenResponse::from(&token),
        sms_simulated,
    }))
}

/// Fetch a voucher and verify it belongs to the authenticated operator.
///
/// Another operator's voucher reads as not found, never as forbidden, so IDs
/// cannot be probed.
fn owned_token(state: &AppState, auth: &AuthUser, id: &str) -> Result<Token, ApiError> {
    let token_id = id
        .parse::<TokenId>()
        .map_err(|_| ApiError::BadRequest("invalid voucher id".into()))?;

    let token = state
        .store
        .get_token(&token_id)?
        .ok_or_else(|| ApiError::NotFound("Voucher not found".into()))?;

    if token.user_id != auth.user_id {
        return Err(ApiError::NotFound("Voucher not found".into()));
    }

    Ok(token)
}
