//! `RocksDB` storage layer for Wipay.
//!
//! This crate provides persistent storage for subscriptions, payment
//! profiles, vouchers, and invoices using `RocksDB` with column families for
//! efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `subscriptions`: one record per operator, keyed by `user_id`
//! - `payment_profiles`: mobile money details, keyed by `user_id`
//! - `hotspot_configs`: network SSIDs, keyed by `user_id`
//! - `tokens`: WiFi vouchers, keyed by `token_id` (ULID)
//! - `tokens_by_user`: index for listing a user's vouchers
//! - `invoices`: customer invoices, keyed by `invoice_id` (ULID)
//! - `invoices_by_user`: index for listing a user's invoices
//!
//! # Example
//!
//! ```no_run
//! use wipay_store::{RocksStore, Store};
//! use wipay_core::{Subscription, UserId};
//!
//! let store = RocksStore::open("/tmp/wipay-db").unwrap();
//!
//! let user_id = UserId::generate();
//! let subscription = Subscription::new_free(user_id, 1);
//! store.put_subscription(&subscription).unwrap();
//!
//! let retrieved = store.get_subscription(&user_id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use wipay_core::{
    BulkAction, HotspotConfig, Invoice, InvoiceId, PaymentProfile, Subscription, Token, TokenId,
    UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Subscription Operations
    // =========================================================================

    /// Insert or update a subscription record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Get a subscription by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_subscription(&self, user_id: &UserId) -> Result<Option<Subscription>>;

    // =========================================================================
    // Payment Profile Operations
    // =========================================================================

    /// Insert or update a payment profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_payment_profile(&self, profile: &PaymentProfile) -> Result<()>;

    /// Get a payment profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_payment_profile(&self, user_id: &UserId) -> Result<Option<PaymentProfile>>;

    // =========================================================================
    // Hotspot Config Operations
    // =========================================================================

    /// Insert or update a hotspot network configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_hotspot_config(&self, user_id: &UserId, config: &HotspotConfig) -> Result<()>;

    /// Get the hotspot configuration for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_hotspot_config(&self, user_id: &UserId) -> Result<Option<HotspotConfig>>;

    // =========================================================================
    // Token Operations
    // =========================================================================

    /// Get a voucher by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_token(&self, token_id: &TokenId) -> Result<Option<Token>>;

    /// Update an existing voucher (deactivation, SMS resend metadata).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the voucher doesn't exist.
    fn update_token(&self, token: &Token) -> Result<()>;

    /// List vouchers for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_tokens_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Token>>;

    // =========================================================================
    // Invoice Operations
    // =========================================================================

    /// Insert or update an invoice.
    ///
    /// This also maintains the user index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_invoice(&self, invoice: &Invoice) -> Result<()>;

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_invoice(&self, invoice_id: &InvoiceId) -> Result<Option<Invoice>>;

    /// List invoices for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_invoices_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Invoice>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Issue a voucher: re-check the plan quota against the stored
    /// subscription, then write the voucher, its index entry, and the
    /// incremented usage counter in one batch.
    ///
    /// The check-and-increment lives inside this single call so a caller-side
    /// read-then-write cannot race past the monthly limit.
    ///
    /// Returns the updated subscription.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the subscription doesn't exist.
    /// - `StoreError::QuotaExceeded` if the monthly limit is reached.
    fn issue_token(&self, token: &Token) -> Result<Subscription>;

    /// Apply a bulk action to a set of accounts as one all-or-nothing batch.
    ///
    /// Every account's payment profile and subscription is read up front; if
    /// any record is missing the whole batch fails and nothing is written.
    ///
    /// Returns the number of accounts updated (always the full set).
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if any account lacks a profile or subscription.
    fn bulk_apply(&self, user_ids: &[UserId], action: &BulkAction) -> Result<usize>;
}
