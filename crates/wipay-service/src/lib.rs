//! Wipay HTTP API Service.
//!
//! This crate provides the HTTP API for the Wipay platform, including:
//!
//! - Operator account registration and hotspot configuration
//! - WiFi voucher issuance, listing, deactivation, and SMS resend
//! - Subscription status and plan changes (charged over MTN MoMo)
//! - Customer invoicing with VAT and aging buckets
//! - Sales report aggregation
//! - Admin bulk actions over operator accounts
//! - MTN MoMo payment webhooks
//!
//! # Authentication
//!
//! Requests carry an HS256 JWT in the `Authorization: Bearer` header. Admin
//! endpoints additionally require a `role: "admin"` claim in the token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Webhook handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod momo;
pub mod routes;
pub mod sms;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use momo::MomoClient;
pub use routes::create_router;
pub use sms::SmsClient;
pub use state::AppState;
