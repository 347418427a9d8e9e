//! Error types for Wipay domain operations.

use crate::plan::Plan;

/// Result type for Wipay domain operations.
pub type Result<T> = std::result::Result<T, WipayError>;

/// Errors raised by the pure domain logic in this crate.
///
/// Storage and gateway failures carry their own error types in the crates
/// that own them. Partial failure (voucher issued but SMS delivery failed)
/// is deliberately not an error: the issue response reports it alongside
/// the generated credentials so they can be communicated manually.
#[derive(Debug, thiserror::Error)]
pub enum WipayError {
    /// Input failed validation before any external call.
    #[error("validation error: {0}")]
    Validation(String),

    /// A paid plan change was attempted without a successful payment.
    #[error("payment required for plan {plan:?}")]
    PaymentRequired {
        /// The target plan.
        plan: Plan,
    },
}
