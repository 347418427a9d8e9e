//! Error types for Wipay storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Monthly token quota reached (checked inside the issuance batch).
    #[error("token quota exceeded: used={used}, limit={limit}")]
    QuotaExceeded {
        /// Tokens already issued this month.
        used: u32,
        /// The plan's monthly allowance.
        limit: u32,
    },
}
