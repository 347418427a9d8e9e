//! Subscription state and quota enforcement for Wipay.
//!
//! One subscription exists per operator account. The subscription tracks the
//! current plan, the billing period, and the monthly token-issuance counter
//! that the voucher issuer checks before creating a token.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WipayError};
use crate::ids::UserId;
use crate::payment::PaymentResult;
use crate::plan::{Plan, Quota, SmsDelivery};

/// Status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is in good standing.
    Active,
    /// A payment failed; access may be restricted.
    PastDue,
    /// Cancelled by the operator.
    Canceled,
    /// Never successfully paid.
    Unpaid,
    /// In a trial period.
    Trialing,
}

/// Plan-gated actions checked before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Issue a WiFi voucher.
    GenerateToken,
    /// Send a real (non-simulated) SMS.
    SendRealSms,
    /// Configure an additional WiFi network.
    AddNetwork,
    /// View custom-range and exportable reports.
    ViewAdvancedReports,
}

/// Result of a plan-gate check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCheck {
    /// Whether the action is permitted under the current plan and usage.
    pub allowed: bool,
    /// Human-readable explanation, shown to the operator when denied.
    pub message: String,
}

impl ActionCheck {
    fn allow(message: impl Into<String>) -> Self {
        Self {
            allowed: true,
            message: message.into(),
        }
    }

    fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: message.into(),
        }
    }
}

/// An operator's subscription to a Wipay plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// The operator account.
    pub user_id: UserId,

    /// The subscribed plan.
    pub plan: Plan,

    /// Current status.
    pub status: SubscriptionStatus,

    /// Start of the current billing period.
    pub current_period_start: DateTime<Utc>,

    /// End of the current billing period.
    pub current_period_end: DateTime<Utc>,

    /// Tokens issued in the current period. Reset on any plan change.
    pub tokens_used_this_month: u32,

    /// Day of the month billing recurs on (1-28 recommended; clamped to
    /// month length otherwise).
    pub billing_day: u32,

    /// Payment gateway customer reference, if one has been created.
    pub gateway_customer_ref: Option<String>,

    /// Payment gateway subscription reference, if one has been created.
    pub gateway_subscription_ref: Option<String>,

    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new Free-plan subscription starting now.
    #[must_use]
    pub fn new_free(user_id: UserId, billing_day: u32) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            plan: Plan::Free,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: advance_one_month(now, billing_day),
            tokens_used_this_month: 0,
            billing_day,
            gateway_customer_ref: None,
            gateway_subscription_ref: None,
            created_at: now,
        }
    }

    /// Check whether a plan-gated action is currently permitted.
    #[must_use]
    pub fn validate_action(&self, action: PlanAction) -> ActionCheck {
        match action {
            PlanAction::GenerateToken => {
                let quota = self.plan.monthly_token_quota();
                if quota.permits(self.tokens_used_this_month) {
                    ActionCheck::allow("token generation allowed")
                } else {
                    let remaining: i64 = quota.remaining(self.tokens_used_this_month).into();
                    ActionCheck::deny(format!(
                        "monthly token limit reached ({} remaining); upgrade your plan to issue more vouchers",
                        remaining
                    ))
                }
            }
            PlanAction::SendRealSms => match self.plan.sms_delivery() {
                SmsDelivery::Real => ActionCheck::allow("real SMS delivery enabled"),
                SmsDelivery::Simulated => {
                    ActionCheck::deny("your plan uses simulated SMS delivery")
                }
            },
            PlanAction::AddNetwork => {
                // Network count is tracked by the caller; the check here is
                // only whether the plan allows more than one.
                match self.plan.wifi_network_quota() {
                    Quota::Unlimited => ActionCheck::allow("unlimited networks"),
                    Quota::Limited(n) if n > 1 => {
                        ActionCheck::allow(format!("up to {n} networks allowed"))
                    }
                    Quota::Limited(_) => {
                        ActionCheck::deny("your plan allows a single WiFi network")
                    }
                }
            }
            PlanAction::ViewAdvancedReports => {
                if self.plan.advanced_reports() {
                    ActionCheck::allow("advanced reports included")
                } else {
                    ActionCheck::deny("advanced reports require the Pro plan or higher")
                }
            }
        }
    }

    /// Remaining token allowance for the current period.
    #[must_use]
    pub fn remaining_tokens(&self) -> Quota {
        self.plan
            .monthly_token_quota()
            .remaining(self.tokens_used_this_month)
    }

    /// Record a successful voucher issuance.
    pub fn record_issuance(&mut self) {
        self.tokens_used_this_month += 1;
    }

    /// Switch to a different plan.
    ///
    /// A paid target plan requires a successful payment result. Upgrade,
    /// downgrade, and lateral switches share identical mechanics: the usage
    /// counter resets to zero and the billing period restarts at `now`,
    /// ending one calendar month later on the configured billing day. No
    /// proration.
    ///
    /// # Errors
    ///
    /// Returns `WipayError::PaymentRequired` if the target plan is paid and
    /// no successful payment result was supplied.
    pub fn change_plan(&mut self, target: Plan, payment: Option<&PaymentResult>) -> Result<()> {
        if target.monthly_price() > 0 && !payment.is_some_and(|p| p.success) {
            return Err(WipayError::PaymentRequired { plan: target });
        }

        let now = Utc::now();
        self.plan = target;
        self.status = SubscriptionStatus::Active;
        self.tokens_used_this_month = 0;
        self.current_period_start = now;
        self.current_period_end = advance_one_month(now, self.billing_day);

        if let Some(reference) = payment.and_then(|p| p.reference_id.as_deref()) {
            self.gateway_subscription_ref = Some(reference.to_string());
        }

        Ok(())
    }
}

/// Advance a timestamp by one calendar month, landing on `billing_day`.
///
/// The day is clamped to the target month's length (billing day 31 lands on
/// Feb 28/29). Time of day is preserved.
#[must_use]
pub fn advance_one_month(from: DateTime<Utc>, billing_day: u32) -> DateTime<Utc> {
    let (mut year, mut month) = (from.year(), from.month());
    if month == 12 {
        year += 1;
        month = 1;
    } else {
        month += 1;
    }

    let day = billing_day.clamp(1, days_in_month(year, month));
    // The clamp above guarantees a valid calendar date.
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| from.date_naive() + Duration::days(30));
    let time = date
        .and_hms_opt(from.hour(), from.minute(), from.second())
        .unwrap_or_else(|| date.and_hms_opt(0, 0, 0).expect("midnight is valid"));

    Utc.from_utc_datetime(&time)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}
