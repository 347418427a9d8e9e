//! Phone number normalization for SMS delivery.
//!
//! The SMS provider expects E.164-formatted numbers. Operators commonly enter
//! local South Sudanese numbers (`09x xxx xxxx`), which normalize to the
//! `+211` country code.

/// Default country code applied to local numbers.
const DEFAULT_COUNTRY_CODE: &str = "+211";

/// Minimum digits in a valid E.164 number (excluding the `+`).
const MIN_DIGITS: usize = 8;

/// Maximum digits in a valid E.164 number (excluding the `+`).
const MAX_DIGITS: usize = 15;

/// Errors from phone number validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    /// The input contains characters other than digits, `+`, spaces, or dashes.
    #[error("phone number contains invalid characters")]
    InvalidCharacters,

    /// The number has too few or too many digits.
    #[error("phone number must have {MIN_DIGITS} to {MAX_DIGITS} digits")]
    InvalidLength,

    /// The input is empty.
    #[error("phone number is empty")]
    Empty,
}

/// Normalize a phone number to E.164-ish form.
///
/// Strips spaces and dashes; a leading `0` is replaced by the `+211` country
/// code; a bare international number gets a `+` prefix.
///
/// # Errors
///
/// Returns a `PhoneError` if the input is empty, contains invalid characters,
/// or normalizes to an out-of-range digit count.
pub fn normalize_number(input: &str) -> Result<String, PhoneError> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if cleaned.is_empty() {
        return Err(PhoneError::Empty);
    }

    let (plus, digits) = match cleaned.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneError::InvalidCharacters);
    }

    let normalized = if plus {
        format!("+{digits}")
    } else if let Some(local) = digits.strip_prefix('0') {
        format!("{DEFAULT_COUNTRY_CODE}{local}")
    } else {
        format!("+{digits}")
    };

    let digit_count = normalized.len() - 1;
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digit_count) {
        return Err(PhoneError::InvalidLength);
    }

    Ok(normalized)
}

/// Check whether a phone number is valid after normalization.
#[must_use]
pub fn validate_number(input: &str) -> bool {
    normalize_number(input).is_ok()
}
