//! Wipay Client SDK.
//!
//! This crate provides a client library for dashboards and kiosk frontends to
//! interact with the Wipay API.
//!
//! # Example
//!
//! ```no_run
//! use wipay_client::{IssueTokenRequest, WipayClient};
//! use wipay_core::{PaymentMethod, TokenDuration};
//!
//! # async fn example() -> Result<(), wipay_client::ClientError> {
//! let client = WipayClient::new("http://wipay.isp-billing.svc:8080", "operator-jwt")?;
//!
//! // Issue a 3-hour voucher paid in cash
//! let issued = client
//!     .issue_token(IssueTokenRequest {
//!         recipient_phone: "0925551234".to_string(),
//!         duration_hours: TokenDuration::ThreeHours.hours(),
//!         payment_method: PaymentMethod::Cash,
//!     })
//!     .await?;
//!
//! println!(
//!     "Voucher {} / {} sold for {} SSP",
//!     issued.token.username, issued.token.password, issued.token.price
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, WipayClient};
pub use error::ClientError;
pub use types::*;
