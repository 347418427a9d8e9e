//! Sales report aggregation for Wipay.
//!
//! Reports are computed over an in-memory snapshot of a user's issued
//! vouchers, already fetched from the store. The aggregation is a commutative
//! reduction: input order never affects the summary figures.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::token::{PaymentMethod, Token};

/// Recent-transactions cap for predefined report periods.
const RECENT_CAP_DEFAULT: usize = 10;

/// Recent-transactions cap for custom date ranges.
const RECENT_CAP_CUSTOM: usize = 20;

/// A reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "period")]
pub enum ReportPeriod {
    /// The last seven days, ending now.
    Week,
    /// From the first of the current month to now.
    Month,
    /// From January 1 of the current year to now.
    Year,
    /// An explicit date range. The end date is inclusive through 23:59:59.
    Custom {
        /// Range start.
        start: DateTime<Utc>,
        /// Range end (extended to the end of its calendar day).
        end: DateTime<Utc>,
    },
}

impl ReportPeriod {
    /// Resolve the period to a concrete `[start, end]` range.
    #[must_use]
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Week => (now - Duration::days(7), now),
            Self::Month => {
                let start = Utc
                    .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                (start, now)
            }
            Self::Year => {
                let start = Utc
                    .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                (start, now)
            }
            Self::Custom { start, end } => (*start, end_of_day(*end)),
        }
    }

    /// Maximum entries in the recent-transactions preview.
    #[must_use]
    pub const fn recent_cap(&self) -> usize {
        match self {
            Self::Custom { .. } => RECENT_CAP_CUSTOM,
            _ => RECENT_CAP_DEFAULT,
        }
    }
}

fn end_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive()
        .and_hms_opt(23, 59, 59)
        .map_or(ts, |t| Utc.from_utc_datetime(&t))
}

/// Per-duration sales statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Vouchers sold.
    pub count: usize,
    /// Revenue in SSP.
    pub revenue: i64,
}

/// Per-payment-method statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStats {
    /// Vouchers sold.
    pub count: usize,
    /// Revenue in SSP.
    pub revenue: i64,
}

/// A row in the recent-transactions preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    /// Voucher ID.
    pub token_id: String,
    /// Buyer phone number.
    pub recipient_phone: String,
    /// Voucher duration in hours.
    pub duration_hours: u32,
    /// Sale price in SSP.
    pub price: i64,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Issuance time.
    pub created_at: DateTime<Utc>,
}

/// Aggregated sales summary for a report period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Range start actually used.
    pub start: DateTime<Utc>,
    /// Range end actually used.
    pub end: DateTime<Utc>,
    /// Total revenue in SSP.
    pub revenue: i64,
    /// Number of vouchers sold.
    pub transactions: usize,
    /// Distinct buyer phone numbers.
    pub unique_customers: usize,
    /// Mean sale price (0 when there are no transactions).
    pub avg_transaction_value: f64,
    /// Sales grouped by voucher duration. Zero-count entries are omitted.
    pub by_duration: BTreeMap<u32, ServiceStats>,
    /// Sales grouped by payment method. Zero-count entries are omitted.
    pub by_method: BTreeMap<String, MethodStats>,
    /// Newest-first preview of sales in the range, capped per period kind.
    pub recent: Vec<RecentTransaction>,
}

/// Aggregate a snapshot of vouchers into a report summary.
///
/// Both range boundaries are inclusive. The summary figures are
/// order-independent over the input slice; only the `recent` preview imposes
/// an ordering (newest first).
#[must_use]
pub fn aggregate(tokens: &[Token], period: &ReportPeriod, now: DateTime<Utc>) -> ReportSummary {
    let (start, end) = period.range(now);

    let in_range: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.created_at >= start && t.created_at <= end)
        .collect();

    let revenue: i64 = in_range.iter().map(|t| t.price).sum();
    let transactions = in_range.len();
    let unique_customers = in_range
        .iter()
        .map(|t| t.recipient_phone.as_str())
        .collect::<HashSet<_>>()
        .len();

    #[allow(clippy::cast_precision_loss)]
    let avg_transaction_value = if transactions == 0 {
        0.0
    } else {
        revenue as f64 / transactions as f64
    };

    let mut by_duration: BTreeMap<u32, ServiceStats> = BTreeMap::new();
    let mut by_method: BTreeMap<String, MethodStats> = BTreeMap::new();
    for token in &in_range {
        let entry = by_duration
            .entry(token.duration.hours())
            .or_insert(ServiceStats {
                count: 0,
                revenue: 0,
            });
        entry.count += 1;
        entry.revenue += token.price;

        let entry = by_method
            .entry(token.payment_method.as_str().to_string())
            .or_insert(MethodStats {
                count: 0,
                revenue: 0,
            });
        entry.count += 1;
        entry.revenue += token.price;
    }

    let mut sorted = in_range;
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent = sorted
        .into_iter()
        .take(period.recent_cap())
        .map(|t| RecentTransaction {
            token_id: t.id.to_string(),
            recipient_phone: t.recipient_phone.clone(),
            duration_hours: t.duration.hours(),
            price: t.price,
            payment_method: t.payment_method,
            created_at: t.created_at,
        })
        .collect();

    ReportSummary {
        start,
        end,
        revenue,
        transactions,
        unique_customers,
        avg_transaction_value,
        by_duration,
        by_method,
        recent,
    }
}

/// Tabular form of a report, handed to the external PDF renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTable {
    /// Report title.
    pub title: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows, one cell per header.
    pub rows: Vec<Vec<String>>,
}

impl ReportSummary {
    /// Build the per-duration sales table for PDF export.
    #[must_use]
    pub fn to_table(&self) -> ReportTable {
        let mut rows: Vec<Vec<String>> = self
            .by_duration
            .iter()
            .map(|(hours, stats)| {
                vec![
                    format!("{hours}h voucher"),
                    stats.count.to_string(),
                    stats.revenue.to_string(),
                ]
            })
            .collect();
        rows.push(vec![
            "Total".to_string(),
            self.transactions.to_string(),
            self.revenue.to_string(),
        ]);

        ReportTable {
            title: format!(
                "Sales {} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
            headers: vec![
                "Service".to_string(),
                "Count".to_string(),
                "Revenue (SSP)".to_string(),
            ],
            rows,
        }
    }
}
