//! Subscription status and plan-change handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use wipay_core::{Plan, SmsDelivery, Subscription};
use wipay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Subscription response.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// Current plan name.
    pub plan: String,
    /// Monthly plan price in SSP.
    pub monthly_price: i64,
    /// Subscription status.
    pub status: String,
    /// Vouchers issued this billing period.
    pub tokens_used_this_month: u32,
    /// Monthly allowance (-1 when unlimited).
    pub monthly_token_quota: i64,
    /// Remaining allowance (-1 when unlimited).
    pub tokens_remaining: i64,
    /// Whether the plan sends real SMS.
    pub real_sms: bool,
    /// Whether the plan includes advanced reports.
    pub advanced_reports: bool,
    /// Billing period start.
    pub current_period_start: String,
    /// Billing period end.
    pub current_period_end: String,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            plan: format!("{:?}", sub.plan).to_lowercase(),
            monthly_price: sub.plan.monthly_price(),
            status: format!("{:?}", sub.status).to_lowercase(),
            tokens_used_this_month: sub.tokens_used_this_month,
            monthly_token_quota: i64::from(sub.plan.monthly_token_quota()),
            tokens_remaining: i64::from(sub.remaining_tokens()),
            real_sms: sub.plan.sms_delivery() == SmsDelivery::Real,
            advanced_reports: sub.plan.advanced_reports(),
            current_period_start: sub.current_period_start.to_rfc3339(),
            current_period_end: sub.current_period_end.to_rfc3339(),
        }
    }
}

/// Get the operator's subscription.
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(SubscriptionResponse::from(&subscription)))
}

/// Plan change request.
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    /// The target plan.
    pub plan: Plan,
}

/// Plan change response.
#[derive(Debug, Serialize)]
pub struct ChangePlanResponse {
    /// The subscription after the change.
    pub subscription: SubscriptionResponse,
    /// MoMo transaction reference, when a charge was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Switch to a different plan.
///
/// Paid targets are charged against the operator's registered MoMo number
/// before the switch. Upgrade and downgrade share identical mechanics: the
/// usage counter resets and the billing period restarts. No proration.
pub async fn change_plan(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<ChangePlanRequest>,
) -> Result<Json<ChangePlanResponse>, ApiError> {
    let mut subscription = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    if body.plan == subscription.plan {
        return Err(ApiError::Conflict("already on this plan".into()));
    }

    let price = body.plan.monthly_price();
    let payment = if price > 0 {
        let momo = state
            .momo
            .as_ref()
            .ok_or_else(|| ApiError::ExternalService("payments are not available".into()))?;
        let mut profile = state
            .store
            .get_payment_profile(&auth.user_id)?
            .ok_or_else(|| ApiError::NotFound("Payment profile not found".into()))?;

        let description = format!("Wipay {:?} plan", body.plan);
        let result = momo
            .charge(&profile.momo_number, price, "SSP", &description)
            .await
            .map_err(|e| ApiError::ExternalService(e.to_string()))?;

        if result.success {
            profile.record_success(Utc::now());
        } else {
            profile.record_failure();
        }
        state.store.put_payment_profile(&profile)?;

        Some(result)
    } else {
        None
    };

    subscription.change_plan(body.plan, payment.as_ref())?;
    state.store.put_subscription(&subscription)?;

    tracing::info!(
        user_id = %auth.user_id,
        plan = ?body.plan,
        charged = %payment.is_some(),
        "Plan changed"
    );

    Ok(Json(ChangePlanResponse {
        subscription: SubscriptionResponse::from(&subscription),
        payment_reference: payment.and_then(|p| p.reference_id),
    }))
}
