//! WiFi voucher (token) types for Wipay.
//!
//! A token is a time-boxed access credential sold to an end customer. Tokens
//! are issued against a pricing table, expire exactly `duration` hours after
//! creation, and are delivered to the buyer by SMS.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WipayError};
use crate::ids::{TokenId, UserId};
use crate::plan::PricingConfig;

/// Length of the random part of a generated username.
const USERNAME_RANDOM_LEN: usize = 8;

/// Length of a generated password.
const PASSWORD_LEN: usize = 12;

/// Base36 alphabet used for credential generation.
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Access durations sold as vouchers.
///
/// The set is closed: the pricing table, the dashboard, and the SMS templates
/// all assume exactly these five durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TokenDuration {
    /// One hour of access.
    OneHour,
    /// Three hours of access.
    ThreeHours,
    /// Six hours of access.
    SixHours,
    /// Twelve hours of access.
    TwelveHours,
    /// Twenty-four hours of access.
    TwentyFourHours,
}

impl TokenDuration {
    /// All durations, in ascending order.
    pub const ALL: [Self; 5] = [
        Self::OneHour,
        Self::ThreeHours,
        Self::SixHours,
        Self::TwelveHours,
        Self::TwentyFourHours,
    ];

    /// The duration in hours.
    #[must_use]
    pub const fn hours(&self) -> u32 {
        match self {
            Self::OneHour => 1,
            Self::ThreeHours => 3,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::TwentyFourHours => 24,
        }
    }
}

impl TryFrom<u32> for TokenDuration {
    type Error = WipayError;

    fn try_from(hours: u32) -> Result<Self> {
        match hours {
            1 => Ok(Self::OneHour),
            3 => Ok(Self::ThreeHours),
            6 => Ok(Self::SixHours),
            12 => Ok(Self::TwelveHours),
            24 => Ok(Self::TwentyFourHours),
            other => Err(WipayError::Validation(format!(
                "unsupported voucher duration: {other} hours"
            ))),
        }
    }
}

impl From<TokenDuration> for u32 {
    fn from(duration: TokenDuration) -> Self {
        duration.hours()
    }
}

/// Lifecycle state of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Issued and within its validity window.
    Active,
    /// Past its expiry time or manually deactivated.
    Expired,
    /// Consumed by the end customer.
    Used,
    /// Created but payment not yet confirmed.
    Pending,
}

/// How the customer paid for the voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to the operator.
    Cash,
    /// MTN Mobile Money transfer.
    MtnMomo,
}

impl PaymentMethod {
    /// Display name used in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::MtnMomo => "mtn_momo",
        }
    }
}

/// Generated WiFi login credentials.
///
/// Usernames are `wifi_` plus 8 random base36 characters; passwords are 12
/// random base36 characters. Generation does not check for collisions against
/// existing tokens; records are keyed by `TokenId`, so a credential collision
/// cannot clobber a stored voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// WiFi login username.
    pub username: String,
    /// WiFi login password.
    pub password: String,
}

impl Credentials {
    /// Generate a fresh random credential pair.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            username: format!("wifi_{}", random_base36(&mut rng, USERNAME_RANDOM_LEN)),
            password: random_base36(&mut rng, PASSWORD_LEN),
        }
    }
}

fn random_base36<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..BASE36.len());
            char::from(BASE36[idx])
        })
        .collect()
}

/// A hotspot network configuration for an operator account.
///
/// Issuing vouchers requires a configured SSID; the service rejects issuance
/// with `NetworkNotConfigured` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// Network SSID printed on vouchers and in SMS messages.
    pub ssid: String,

    /// When the network was configured.
    pub configured_at: DateTime<Utc>,
}

impl HotspotConfig {
    /// Create a configuration for the given SSID.
    #[must_use]
    pub fn new(ssid: String) -> Self {
        Self {
            ssid,
            configured_at: Utc::now(),
        }
    }
}

/// A timed WiFi access voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Unique voucher ID (ULID, time-ordered).
    pub id: TokenId,

    /// The issuing operator account.
    pub user_id: UserId,

    /// Phone number the credentials were sold/delivered to.
    pub recipient_phone: String,

    /// Access duration.
    pub duration: TokenDuration,

    /// Sale price in SSP.
    pub price: i64,

    /// Currency code for `price`.
    pub currency: String,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Lifecycle state.
    pub status: TokenStatus,

    /// Generated WiFi credentials.
    pub credentials: Credentials,

    /// Whether the voucher currently grants access.
    pub is_active: bool,

    /// When the voucher was issued.
    pub created_at: DateTime<Utc>,

    /// When the voucher stops granting access.
    pub expires_at: DateTime<Utc>,

    /// How many times the credentials SMS has been re-sent.
    pub sms_resend_count: u32,

    /// When the credentials SMS was last sent, if ever.
    pub last_sms_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Issue a new voucher.
    ///
    /// Looks up the unit price for `duration`, generates credentials, and
    /// computes `expires_at = created_at + duration` exactly.
    ///
    /// # Errors
    ///
    /// Returns `WipayError::Validation` if the pricing table has no entry for
    /// the requested duration.
    pub fn issue(
        user_id: UserId,
        recipient_phone: String,
        duration: TokenDuration,
        payment_method: PaymentMethod,
        pricing: &PricingConfig,
    ) -> Result<Self> {
        let price = pricing.price_for(duration).ok_or_else(|| {
            WipayError::Validation(format!(
                "no price configured for {} hour vouchers",
                duration.hours()
            ))
        })?;

        let created_at = Utc::now();
        Ok(Self {
            id: TokenId::generate(),
            user_id,
            recipient_phone,
            duration,
            price,
            currency: pricing.currency.clone(),
            payment_method,
            status: TokenStatus::Active,
            credentials: Credentials::generate(),
            is_active: true,
            created_at,
            expires_at: created_at + Duration::hours(i64::from(duration.hours())),
            sms_resend_count: 0,
            last_sms_at: None,
        })
    }

    /// Whether the voucher is past its expiry time.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Manually deactivate the voucher.
    ///
    /// Deactivation is permanent: the voucher stops granting access and its
    /// status moves to `Expired`.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.status = TokenStatus::Expired;
    }

    /// Record that the credentials SMS was (re-)sent.
    pub fn record_sms_sent(&mut self, now: DateTime<Utc>) {
        if self.last_sms_at.is_some() {
            self.sms_resend_count += 1;
        }
        self.last_sms_at = Some(now);
    }

    /// The SMS body delivered to the buyer.
    #[must_use]
    pub fn sms_message(&self, ssid: &str) -> String {
        format!(
            "WiFi access ({}h): network {}, username {}, password {}. Valid until {}.",
            self.duration.hours(),
            ssid,
            self.credentials.username,
            self.credentials.password,
            self.expires_at.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}
