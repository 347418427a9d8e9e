//! Admin bulk-action transitions for Wipay.
//!
//! Bulk actions mutate payment profiles and subscriptions for a set of
//! operator accounts. The transitions here are pure; the store applies them
//! as one all-or-nothing write batch, so either every selected account
//! changes or none do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payment::{AccountStatus, PaymentProfile};
use crate::plan::Plan;
use crate::subscription::{Subscription, SubscriptionStatus};

/// A bulk action applied to a set of operator accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum BulkAction {
    /// Suspend the accounts: payment profile `Suspended`, subscription `PastDue`.
    Suspend,
    /// Reactivate the accounts: payment profile `Active`, subscription `Active`.
    Activate,
    /// Record a reminder timestamp. Delivery is a separate external call.
    SendReminder,
    /// Zero the failed-payment counter.
    ResetPaymentAttempts,
    /// Switch the accounts to a new plan (admin override; no payment check).
    UpdatePlan {
        /// The target plan.
        plan: Plan,
    },
}

/// Outcome of a bulk action, at batch granularity.
///
/// The batch is all-or-nothing: `success` and `failed` are mutually
/// exclusive — either every account was updated or none were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Accounts updated (the full set on success, 0 on failure).
    pub success: usize,
    /// Accounts not updated (0 on success, the full set on failure).
    pub failed: usize,
}

/// Apply a bulk action to one account's records in place.
///
/// Returns the reminder timestamp recorded, if the action was `SendReminder`.
pub fn apply_bulk_action(
    profile: &mut PaymentProfile,
    subscription: &mut Subscription,
    action: &BulkAction,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match action {
        BulkAction::Suspend => {
            profile.account_status = AccountStatus::Suspended;
            subscription.status = SubscriptionStatus::PastDue;
            None
        }
        BulkAction::Activate => {
            profile.account_status = AccountStatus::Active;
            subscription.status = SubscriptionStatus::Active;
            None
        }
        BulkAction::SendReminder => {
            profile.last_reminder_at = Some(now);
            Some(now)
        }
        BulkAction::ResetPaymentAttempts => {
            profile.total_failed_attempts = 0;
            None
        }
        BulkAction::UpdatePlan { plan } => {
            // Same reset mechanics as a user-initiated plan change, minus the
            // payment check (admin override).
            subscription.plan = *plan;
            subscription.status = SubscriptionStatus::Active;
            subscription.tokens_used_this_month = 0;
            subscription.current_period_start = now;
            subscription.current_period_end =
                crate::subscription::advance_one_month(now, subscription.billing_day);
            None
        }
    }
}
