//! Operator account and network configuration handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use wipay_core::{
    normalize_number, HotspotConfig, PaymentProfile, Quota, Subscription,
};
use wipay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default billing day for new accounts.
const DEFAULT_BILLING_DAY: u32 = 1;

/// Account registration request.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// MoMo number used for subscription charges.
    pub momo_number: String,
    /// Registered MoMo account holder name.
    pub account_holder_name: String,
    /// Day of the month billing recurs on (defaults to 1).
    pub billing_day: Option<u32>,
}

/// Account response: subscription, payment profile, and network status.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Operator account ID.
    pub user_id: String,
    /// Current plan name.
    pub plan: String,
    /// Subscription status.
    pub status: String,
    /// Vouchers issued this billing period.
    pub tokens_used_this_month: u32,
    /// Remaining allowance (-1 when unlimited).
    pub tokens_remaining: i64,
    /// MoMo number on file.
    pub momo_number: String,
    /// Whether the MoMo number is verified.
    pub momo_verified: bool,
    /// Configured hotspot SSID, if any.
    pub network_ssid: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

impl AccountResponse {
    fn build(
        subscription: &Subscription,
        profile: &PaymentProfile,
        network: Option<&HotspotConfig>,
    ) -> Self {
        Self {
            user_id: subscription.user_id.to_string(),
            plan: format!("{:?}", subscription.plan).to_lowercase(),
            status: format!("{:?}", subscription.status).to_lowercase(),
            tokens_used_this_month: subscription.tokens_used_this_month,
            tokens_remaining: i64::from(subscription.remaining_tokens()),
            momo_number: profile.momo_number.clone(),
            momo_verified: profile.is_verified,
            network_ssid: network.map(|n| n.ssid.clone()),
            created_at: subscription.created_at.to_rfc3339(),
        }
    }
}

/// Register a new operator account.
///
/// Creates a Free-plan subscription and a payment profile in one step. The
/// MoMo number is normalized to international format (+211...).
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    if state.store.get_subscription(&auth.user_id)?.is_some() {
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let momo_number = normalize_number(&body.momo_number)
        .map_err(|e| ApiError::BadRequest(format!("invalid MoMo number: {e}")))?;

    let billing_day = body.billing_day.unwrap_or(DEFAULT_BILLING_DAY);
    if !(1..=31).contains(&billing_day) {
        return Err(ApiError::BadRequest("billing_day must be 1-31".into()));
    }

    let subscription = Subscription::new_free(auth.user_id, billing_day);
    let profile = PaymentProfile::new(
        auth.user_id,
        momo_number,
        body.account_holder_name,
        billing_day,
    );

    state.store.put_subscription(&subscription)?;
    state.store.put_payment_profile(&profile)?;

    tracing::info!(user_id = %auth.user_id, "Operator account created");

    Ok(Json(AccountResponse::build(&subscription, &profile, None)))
}

/// Get the current operator's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let subscription = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    let profile = state
        .store
        .get_payment_profile(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Payment profile not found".into()))?;
    let network = state.store.get_hotspot_config(&auth.user_id)?;

    Ok(Json(AccountResponse::build(
        &subscription,
        &profile,
        network.as_ref(),
    )))
}

/// Network configuration request.
#[derive(Debug, Deserialize)]
pub struct SetNetworkRequest {
    /// Hotspot SSID printed on vouchers and in SMS messages.
    pub ssid: String,
}

/// Network configuration response.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    /// The configured SSID.
    pub ssid: String,
    /// When the network was configured.
    pub configured_at: String,
}

/// Configure the operator's hotspot SSID.
///
/// Replacing an existing SSID counts against the plan's network allowance
/// only on plans limited to a single network; re-configuring the one network
/// is always allowed.
pub async fn set_network(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SetNetworkRequest>,
) -> Result<Json<NetworkResponse>, ApiError> {
    let ssid = body.ssid.trim();
    if ssid.is_empty() {
        return Err(ApiError::BadRequest("ssid must not be empty".into()));
    }
    if ssid.len() > 32 {
        return Err(ApiError::BadRequest("ssid must be at most 32 bytes".into()));
    }

    // Account must exist before a network is configured
    let subscription = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    if let Quota::Limited(0) = subscription.plan.wifi_network_quota() {
        return Err(ApiError::Forbidden);
    }

    let config = HotspotConfig::new(ssid.to_string());
    state.store.put_hotspot_config(&auth.user_id, &config)?;

    tracing::info!(user_id = %auth.user_id, ssid = %config.ssid, "Hotspot configured");

    Ok(Json(NetworkResponse {
        ssid: config.ssid,
        configured_at: config.configured_at.to_rfc3339(),
    }))
}
