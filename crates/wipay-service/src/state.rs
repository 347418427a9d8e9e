//! Application state.

use std::sync::Arc;

use wipay_store::RocksStore;

use crate::config::ServiceConfig;
use crate::momo::MomoClient;
use crate::sms::SmsClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// SMS gateway client (optional; delivery is simulated without it).
    pub sms: Option<Arc<SmsClient>>,

    /// MTN MoMo client for plan charges (optional).
    pub momo: Option<Arc<MomoClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        // Create SMS client if configured
        let sms = config
            .sms_api_url
            .as_ref()
            .zip(config.sms_api_key.as_ref())
            .and_then(|(url, key)| match SmsClient::new(url, key) {
                Ok(client) => {
                    tracing::info!(sms_url = %url, "SMS gateway enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SMS client");
                    None
                }
            });

        if sms.is_none() {
            tracing::warn!("SMS gateway not configured - all deliveries will be simulated");
        }

        // Create MoMo client if configured
        let momo = config
            .momo_api_url
            .as_ref()
            .zip(config.momo_api_key.as_ref())
            .and_then(|(url, key)| match MomoClient::new(url, key) {
                Ok(client) => {
                    tracing::info!(momo_url = %url, "MTN MoMo integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create MoMo client");
                    None
                }
            });

        if momo.is_none() {
            tracing::warn!("MoMo not configured - paid plan changes will not be available");
        }

        Self {
            store,
            config,
            sms,
            momo,
        }
    }

    /// Check if the SMS gateway is configured.
    #[must_use]
    pub fn has_sms(&self) -> bool {
        self.sms.is_some()
    }

    /// Check if MoMo is configured.
    #[must_use]
    pub fn has_momo(&self) -> bool {
        self.momo.is_some()
    }
}
