//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use wipay_core::Plan;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Monthly voucher quota exhausted.
    #[error("token quota exceeded: used={used}, limit={limit}")]
    QuotaExceeded {
        /// Vouchers issued this month.
        used: u32,
        /// The plan's monthly allowance.
        limit: u32,
    },

    /// A paid plan change was requested without a successful payment.
    #[error("payment required for {plan:?} plan")]
    PaymentRequired {
        /// The plan that needs payment.
        plan: Plan,
    },

    /// Voucher issuance attempted before the hotspot SSID was configured.
    #[error("no WiFi network configured")]
    NetworkNotConfigured,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::QuotaExceeded { used, limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exceeded",
                self.to_string(),
                Some(serde_json::json!({
                    "used": used,
                    "limit": limit
                })),
            ),
            Self::PaymentRequired { plan } => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                self.to_string(),
                Some(serde_json::json!({ "plan": plan })),
            ),
            Self::NetworkNotConfigured => (
                StatusCode::PRECONDITION_FAILED,
                "network_not_configured",
                "Configure your WiFi network before issuing vouchers".to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<wipay_store::StoreError> for ApiError {
    fn from(err: wipay_store::StoreError) -> Self {
        match err {
            wipay_store::StoreError::NotFound => Self::NotFound("record not found".into()),
            wipay_store::StoreError::QuotaExceeded { used, limit } => {
                Self::QuotaExceeded { used, limit }
            }
            wipay_store::StoreError::Database(msg)
            | wipay_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<wipay_core::WipayError> for ApiError {
    fn from(err: wipay_core::WipayError) -> Self {
        match err {
            wipay_core::WipayError::Validation(msg) => Self::BadRequest(msg),
            wipay_core::WipayError::PaymentRequired { plan } => Self::PaymentRequired { plan },
        }
    }
}
