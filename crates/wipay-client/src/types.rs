//! Request and response types for the Wipay API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wipay_core::PaymentMethod;

/// Voucher issuance request.
#[derive(Debug, Clone, Serialize)]
pub struct IssueTokenRequest {
    /// Buyer phone number (local or international format).
    pub recipient_phone: String,
    /// Voucher duration in hours (1, 3, 6, 12, or 24).
    pub duration_hours: u32,
    /// How the buyer paid.
    pub payment_method: PaymentMethod,
}

/// A voucher as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    /// Voucher ID.
    pub id: String,
    /// Buyer phone number (normalized).
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
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Credentials SMS resend count.
    pub sms_resend_count: u32,
}

/// Voucher issuance response.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTokenResponse {
    /// The issued voucher.
    pub token: TokenInfo,
    /// Whether the credentials SMS was sent.
    pub sms_delivered: bool,
    /// Whether delivery was simulated.
    pub sms_simulated: bool,
    /// Delivery warning, when the voucher was issued but the SMS failed.
    #[serde(default)]
    pub warning: Option<String>,
    /// Remaining monthly allowance (-1 when unlimited).
    pub tokens_remaining: i64,
}

/// Subscription state as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionInfo {
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
}

/// Per-group sales statistics in a report.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GroupStats {
    /// Vouchers sold.
    pub count: usize,
    /// Revenue in SSP.
    pub revenue: i64,
}

/// Sales report summary as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummary {
    /// Range start.
    pub start: DateTime<Utc>,
    /// Range end.
    pub end: DateTime<Utc>,
    /// Total revenue in SSP.
    pub revenue: i64,
    /// Number of vouchers sold.
    pub transactions: usize,
    /// Distinct buyer phone numbers.
    pub unique_customers: usize,
    /// Mean sale price.
    pub avg_transaction_value: f64,
    /// Sales grouped by voucher duration (hours).
    pub by_duration: BTreeMap<String, GroupStats>,
    /// Sales grouped by payment method.
    pub by_method: BTreeMap<String, GroupStats>,
}

/// API error response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error body.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details, when present.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
