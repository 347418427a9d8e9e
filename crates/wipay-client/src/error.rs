//! Client error types.

/// Errors that can occur when using the Wipay client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Monthly voucher quota exhausted.
    #[error("token quota exceeded: used={used}, limit={limit}")]
    QuotaExceeded {
        /// Vouchers issued this month.
        used: u32,
        /// The plan's monthly allowance.
        limit: u32,
    },

    /// A paid plan change needs a successful payment first.
    #[error("payment required: {message}")]
    PaymentRequired {
        /// Server-provided message.
        message: String,
    },

    /// The hotspot SSID is not configured yet.
    #[error("no WiFi network configured")]
    NetworkNotConfigured,

    /// Resource not found.
    #[error("not found: {message}")]
    NotFound {
        /// Server-provided message.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
