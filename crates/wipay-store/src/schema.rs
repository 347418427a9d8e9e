//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Subscription records, keyed by `user_id`.
    pub const SUBSCRIPTIONS: &str = "subscriptions";

    /// Payment profiles, keyed by `user_id`.
    pub const PAYMENT_PROFILES: &str = "payment_profiles";

    /// Hotspot network configurations, keyed by `user_id`.
    pub const HOTSPOT_CONFIGS: &str = "hotspot_configs";

    /// WiFi vouchers, keyed by `token_id` (ULID).
    pub const TOKENS: &str = "tokens";

    /// Index: vouchers by user, keyed by `user_id || token_id`.
    /// Value is empty (index only).
    pub const TOKENS_BY_USER: &str = "tokens_by_user";

    /// Invoices, keyed by `invoice_id` (ULID).
    pub const INVOICES: &str = "invoices";

    /// Index: invoices by user, keyed by `user_id || invoice_id`.
    /// Value is empty (index only).
    pub const INVOICES_BY_USER: &str = "invoices_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::SUBSCRIPTIONS,
        cf::PAYMENT_PROFILES,
        cf::HOTSPOT_CONFIGS,
        cf::TOKENS,
        cf::TOKENS_BY_USER,
        cf::INVOICES,
        cf::INVOICES_BY_USER,
    ]
}
