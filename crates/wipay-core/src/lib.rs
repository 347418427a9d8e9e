//! Core types and business rules for Wipay.
//!
//! This crate provides the domain logic shared across the Wipay platform:
//!
//! - **Identifiers**: `UserId`, `TokenId`, `InvoiceId`
//! - **Vouchers**: `Token`, `TokenDuration`, `Credentials`, `PricingConfig`
//! - **Subscriptions**: `Plan`, `Subscription`, `Quota`, action validation
//! - **Billing**: `Invoice`, `compute_invoice`, aging buckets
//! - **Reports**: `ReportPeriod`, `aggregate`, `ReportSummary`
//! - **Admin**: `BulkAction` transitions over payment profiles
//!
//! # Money
//!
//! All amounts are whole South Sudanese Pounds (SSP) stored as `i64`.
//! Voucher prices, plan prices, and invoice amounts never carry fractional
//! units in this market, so integer arithmetic is exact.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod admin;
pub mod error;
pub mod ids;
pub mod invoice;
pub mod payment;
pub mod phone;
pub mod plan;
pub mod report;
pub mod subscription;
pub mod token;

pub use admin::{apply_bulk_action, BulkAction, BulkOutcome};
pub use error::{Result, WipayError};
pub use ids::{IdError, InvoiceId, TokenId, UserId};
pub use invoice::{
    compute_invoice, AgingBucket, Invoice, InvoiceStatus, InvoiceTotals, PlanType,
    EQUIPMENT_FEE_SSP, INSTALLATION_FEE_SSP,
};
pub use payment::{AccountStatus, PaymentProfile, PaymentResult};
pub use phone::{normalize_number, validate_number, PhoneError};
pub use plan::{Plan, PricingConfig, Quota, SmsDelivery};
pub use report::{aggregate, MethodStats, ReportPeriod, ReportSummary, ReportTable, ServiceStats};
pub use subscription::{ActionCheck, PlanAction, Subscription, SubscriptionStatus};
pub use token::{Credentials, HotspotConfig, PaymentMethod, Token, TokenDuration, TokenStatus};
