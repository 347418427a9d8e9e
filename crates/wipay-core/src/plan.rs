//! Subscription plan catalog and voucher pricing for Wipay.
//!
//! This module defines the plan tiers, their feature limits, and the
//! per-duration voucher price table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::token::TokenDuration;

// ============================================================================
// Constants
// ============================================================================

/// Free plan monthly token allowance.
pub const FREE_TOKENS_PER_MONTH: u32 = 10;

/// Basic plan monthly token allowance.
pub const BASIC_TOKENS_PER_MONTH: u32 = 100;

/// Pro plan monthly token allowance.
pub const PRO_TOKENS_PER_MONTH: u32 = 500;

/// Basic plan monthly price in SSP.
pub const BASIC_PLAN_PRICE_SSP: i64 = 5_000;

/// Pro plan monthly price in SSP.
pub const PRO_PLAN_PRICE_SSP: i64 = 15_000;

/// Enterprise plan monthly price in SSP.
pub const ENTERPRISE_PLAN_PRICE_SSP: i64 = 50_000;

/// A monthly allowance that may be unlimited.
///
/// Serialized as `-1` for unlimited and `n` for a limited allowance, which is
/// the wire shape the dashboard and client SDK expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Quota {
    /// No cap.
    Unlimited,
    /// Capped at the given count.
    Limited(u32),
}

impl Quota {
    /// Check whether `used` is still within this allowance.
    #[must_use]
    pub const fn permits(&self, used: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => used < *limit,
        }
    }

    /// Remaining count, saturating at zero. `Unlimited` stays unlimited.
    #[must_use]
    pub const fn remaining(&self, used: u32) -> Self {
        match self {
            Self::Unlimited => Self::Unlimited,
            Self::Limited(limit) => Self::Limited(limit.saturating_sub(used)),
        }
    }
}

impl From<i64> for Quota {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::Unlimited
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self::Limited(value.min(i64::from(u32::MAX)) as u32)
        }
    }
}

impl From<Quota> for i64 {
    fn from(quota: Quota) -> Self {
        match quota {
            Quota::Unlimited => -1,
            Quota::Limited(n) => Self::from(n),
        }
    }
}

/// How SMS credential delivery behaves for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsDelivery {
    /// Messages go through the real SMS provider.
    Real,
    /// Messages are logged only; no external call is made.
    Simulated,
}

/// Available subscription plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier: 10 tokens/month, simulated SMS, one network.
    Free,

    /// Basic plan: 100 tokens/month, real SMS, one network.
    Basic,

    /// Pro plan: 500 tokens/month, real SMS, three networks, advanced reports.
    Pro,

    /// Enterprise plan: unlimited tokens and networks, advanced reports.
    Enterprise,
}

impl Plan {
    /// Monthly voucher-issuance allowance for this plan.
    #[must_use]
    pub const fn monthly_token_quota(&self) -> Quota {
        match self {
            Self::Free => Quota::Limited(FREE_TOKENS_PER_MONTH),
            Self::Basic => Quota::Limited(BASIC_TOKENS_PER_MONTH),
            Self::Pro => Quota::Limited(PRO_TOKENS_PER_MONTH),
            Self::Enterprise => Quota::Unlimited,
        }
    }

    /// SMS delivery mode for this plan.
    #[must_use]
    pub const fn sms_delivery(&self) -> SmsDelivery {
        match self {
            Self::Free => SmsDelivery::Simulated,
            Self::Basic | Self::Pro | Self::Enterprise => SmsDelivery::Real,
        }
    }

    /// How many WiFi networks the plan allows.
    #[must_use]
    pub const fn wifi_network_quota(&self) -> Quota {
        match self {
            Self::Free | Self::Basic => Quota::Limited(1),
            Self::Pro => Quota::Limited(3),
            Self::Enterprise => Quota::Unlimited,
        }
    }

    /// Whether the plan includes advanced (custom-range, exportable) reports.
    #[must_use]
    pub const fn advanced_reports(&self) -> bool {
        matches!(self, Self::Pro | Self::Enterprise)
    }

    /// Monthly price in SSP.
    #[must_use]
    pub const fn monthly_price(&self) -> i64 {
        match self {
            Self::Free => 0,
            Self::Basic => BASIC_PLAN_PRICE_SSP,
            Self::Pro => PRO_PLAN_PRICE_SSP,
            Self::Enterprise => ENTERPRISE_PLAN_PRICE_SSP,
        }
    }
}

/// Voucher price table, keyed by access duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price in SSP per voucher duration.
    pub prices: HashMap<TokenDuration, i64>,

    /// Display currency code.
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut prices = HashMap::new();
        prices.insert(TokenDuration::OneHour, 100);
        prices.insert(TokenDuration::ThreeHours, 250);
        prices.insert(TokenDuration::SixHours, 400);
        prices.insert(TokenDuration::TwelveHours, 700);
        prices.insert(TokenDuration::TwentyFourHours, 1_200);

        Self {
            prices,
            currency: "SSP".to_string(),
        }
    }
}

impl PricingConfig {
    /// Look up the unit price for a voucher duration.
    #[must_use]
    pub fn price_for(&self, duration: TokenDuration) -> Option<i64> {
        self.prices.get(&duration).copied()
    }
}
