//! Invoice calculation and aging classification for Wipay.
//!
//! Invoices cover subscription and installation billing for postpaid ISP
//! customers. Amounts are whole SSP; VAT is computed from a percentage rate
//! and rounded to the nearest pound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{InvoiceId, UserId};

// ============================================================================
// Constants
// ============================================================================

/// Fixed installation fee in SSP.
pub const INSTALLATION_FEE_SSP: i64 = 200;

/// Fixed equipment fee in SSP.
pub const EQUIPMENT_FEE_SSP: i64 = 150;

/// Billing arrangement for an invoiced customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Paid in advance.
    Prepaid,
    /// Billed after service.
    Postpaid,
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Awaiting payment.
    Pending,
    /// Fully paid.
    Paid,
    /// Past due date. Set explicitly; there is no automatic transition.
    Overdue,
    /// Partially paid.
    Partial,
}

/// Computed invoice amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Base amount plus any optional fees.
    pub subtotal: i64,
    /// VAT on the subtotal, rounded to the nearest pound.
    pub vat_amount: i64,
    /// Subtotal plus VAT.
    pub total: i64,
}

/// Compute invoice totals from a base amount, optional fixed fees, and a VAT
/// rate in percent.
///
/// The dashboard offers only 0% and 18%, but any non-negative rate is
/// accepted here.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute_invoice(
    base_amount: i64,
    include_installation: bool,
    include_equipment: bool,
    vat_rate_percent: f64,
) -> InvoiceTotals {
    let mut subtotal = base_amount;
    if include_installation {
        subtotal += INSTALLATION_FEE_SSP;
    }
    if include_equipment {
        subtotal += EQUIPMENT_FEE_SSP;
    }

    #[allow(clippy::cast_precision_loss)]
    let vat_amount = (subtotal as f64 * vat_rate_percent / 100.0).round() as i64;

    InvoiceTotals {
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Days-past-due classification used by billing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// 0-30 days overdue.
    Days0To30,
    /// 31-60 days overdue.
    Days31To60,
    /// 61-90 days overdue.
    Days61To90,
    /// More than 90 days overdue.
    Over90,
}

impl AgingBucket {
    /// Classify a days-overdue count into its bucket.
    #[must_use]
    pub const fn classify(days_overdue: u32) -> Self {
        match days_overdue {
            0..=30 => Self::Days0To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }

    /// Display label used in report tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Days0To30 => "0-30 days",
            Self::Days31To60 => "31-60 days",
            Self::Days61To90 => "61-90 days",
            Self::Over90 => "90+ days",
        }
    }
}

/// A customer invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice ID (ULID, time-ordered).
    pub id: InvoiceId,

    /// The operator account that generated the invoice.
    pub user_id: UserId,

    /// Customer name or identifier.
    pub customer: String,

    /// Billing arrangement.
    pub plan_type: PlanType,

    /// Base amount in SSP before fees and VAT.
    pub base_amount: i64,

    /// Installation fee applied (0 if not included).
    pub installation_fee: i64,

    /// Equipment fee applied (0 if not included).
    pub equipment_fee: i64,

    /// VAT amount in SSP.
    pub vat_amount: i64,

    /// Grand total in SSP.
    pub total_amount: i64,

    /// Amount received so far.
    pub amount_paid: i64,

    /// When payment is due.
    pub due_date: DateTime<Utc>,

    /// Payment state.
    pub status: InvoiceStatus,

    /// When the invoice was generated.
    pub generated_date: DateTime<Utc>,

    /// How many payment reminders have been recorded.
    pub reminders_sent: u32,

    /// When the last reminder was recorded, if any.
    pub last_reminder_at: Option<DateTime<Utc>>,

    /// Days past due. Set at creation or by explicit update only.
    pub days_overdue: u32,
}

impl Invoice {
    /// Create a pending invoice from computed totals.
    #[must_use]
    pub fn new(
        user_id: UserId,
        customer: String,
        plan_type: PlanType,
        base_amount: i64,
        include_installation: bool,
        include_equipment: bool,
        vat_rate_percent: f64,
        due_date: DateTime<Utc>,
    ) -> Self {
        let totals = compute_invoice(
            base_amount,
            include_installation,
            include_equipment,
            vat_rate_percent,
        );

        Self {
            id: InvoiceId::generate(),
            user_id,
            customer,
            plan_type,
            base_amount,
            installation_fee: if include_installation {
                INSTALLATION_FEE_SSP
            } else {
                0
            },
            equipment_fee: if include_equipment { EQUIPMENT_FEE_SSP } else { 0 },
            vat_amount: totals.vat_amount,
            total_amount: totals.total,
            amount_paid: 0,
            due_date,
            status: InvoiceStatus::Pending,
            generated_date: Utc::now(),
            reminders_sent: 0,
            last_reminder_at: None,
            days_overdue: 0,
        }
    }

    /// Record a payment against the invoice.
    ///
    /// Moves the status to `Paid` when the running total covers the full
    /// amount, `Partial` otherwise.
    pub fn record_payment(&mut self, amount: i64) {
        self.amount_paid += amount;
        self.status = if self.amount_paid >= self.total_amount {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
    }

    /// Record that a reminder was sent. Delivery itself is a separate
    /// external call; this only updates the counter and timestamp.
    pub fn record_reminder(&mut self, now: DateTime<Utc>) {
        self.reminders_sent += 1;
        self.last_reminder_at = Some(now);
    }

    /// Amount still outstanding.
    #[must_use]
    pub const fn balance_due(&self) -> i64 {
        self.total_amount - self.amount_paid
    }

    /// The aging bucket for this invoice's current `days_overdue`.
    #[must_use]
    pub const fn aging_bucket(&self) -> AgingBucket {
        AgingBucket::classify(self.days_overdue)
    }
}
