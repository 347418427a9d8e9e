//! Payment profile types for Wipay.
//!
//! Every operator account carries a payment profile with their mobile money
//! details and billing standing. Profiles are mutated by payment retry and
//! verification flows and by admin bulk actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::subscription::advance_one_month;

/// Standing of an operator's payment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// In good standing.
    Active,
    /// Suspended, typically by an admin bulk action after failed payments.
    Suspended,
    /// Disabled permanently.
    Disabled,
}

/// Mobile money payment profile for an operator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProfile {
    /// The operator account.
    pub user_id: UserId,

    /// MTN MoMo number charged for subscription renewals.
    pub momo_number: String,

    /// Registered account holder name.
    pub account_holder_name: String,

    /// Whether the MoMo number has been verified.
    pub is_verified: bool,

    /// Current account standing.
    pub account_status: AccountStatus,

    /// Consecutive failed payment attempts.
    pub total_failed_attempts: u32,

    /// When the last successful payment completed, if any.
    pub last_successful_payment: Option<DateTime<Utc>>,

    /// Next scheduled billing date, if known.
    pub next_billing_date: Option<DateTime<Utc>>,

    /// When a payment reminder was last recorded for this account.
    pub last_reminder_at: Option<DateTime<Utc>>,

    /// Day of the month billing recurs on.
    pub billing_day: u32,
}

impl PaymentProfile {
    /// Create an unverified profile in good standing.
    #[must_use]
    pub fn new(
        user_id: UserId,
        momo_number: String,
        account_holder_name: String,
        billing_day: u32,
    ) -> Self {
        Self {
            user_id,
            momo_number,
            account_holder_name,
            is_verified: false,
            account_status: AccountStatus::Active,
            total_failed_attempts: 0,
            last_successful_payment: None,
            next_billing_date: None,
            last_reminder_at: None,
            billing_day,
        }
    }

    /// Record a successful payment: clears the failure counter and schedules
    /// the next billing date one calendar month out.
    pub fn record_success(&mut self, now: DateTime<Utc>) {
        self.total_failed_attempts = 0;
        self.last_successful_payment = Some(now);
        self.next_billing_date = Some(advance_one_month(now, self.billing_day));
    }

    /// Record a failed payment attempt.
    pub fn record_failure(&mut self) {
        self.total_failed_attempts += 1;
    }
}

/// Result returned by the mobile money gateway for a charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Whether the charge completed.
    pub success: bool,

    /// Gateway transaction reference, present on success.
    pub reference_id: Option<String>,

    /// Gateway error message, present on failure.
    pub error: Option<String>,
}

impl PaymentResult {
    /// A successful result with the given gateway reference.
    #[must_use]
    pub fn succeeded(reference_id: impl Into<String>) -> Self {
        Self {
            success: true,
            reference_id: Some(reference_id.into()),
            error: None,
        }
    }

    /// A failed result with the given error message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reference_id: None,
            error: Some(error.into()),
        }
    }
}
