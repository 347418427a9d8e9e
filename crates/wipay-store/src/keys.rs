//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use wipay_core::{InvoiceId, TokenId, UserId};

/// Create a subscription/profile/config key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a voucher key from a token ID.
#[must_use]
pub fn token_key(token_id: &TokenId) -> Vec<u8> {
    token_id.to_bytes().to_vec()
}

/// Create a user-token index key.
///
/// Format: `user_id (16 bytes) || token_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a user's vouchers sort chronologically.
#[must_use]
pub fn user_token_key(user_id: &UserId, token_id: &TokenId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&token_id.to_bytes());
    key
}

/// Create a prefix for iterating all vouchers for a user.
#[must_use]
pub fn user_tokens_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the token ID from a user-token index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_token_id_from_user_key(key: &[u8]) -> TokenId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TokenId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create an invoice key from an invoice ID.
#[must_use]
pub fn invoice_key(invoice_id: &InvoiceId) -> Vec<u8> {
    invoice_id.to_bytes().to_vec()
}

/// Create a user-invoice index key.
///
/// Format: `user_id (16 bytes) || invoice_id (16 bytes)`
#[must_use]
pub fn user_invoice_key(user_id: &UserId, invoice_id: &InvoiceId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&invoice_id.to_bytes());
    key
}

/// Extract the invoice ID from a user-invoice index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_invoice_id_from_user_key(key: &[u8]) -> InvoiceId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    InvoiceId::from_bytes(bytes).expect("valid ULID bytes")
}
