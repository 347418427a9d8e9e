//! SMS gateway client.
//!
//! Voucher credentials are delivered to buyers by SMS. Plans below Basic get
//! simulated delivery (logged, no external call); whether a given send is real
//! or simulated is decided by the caller from the plan's `SmsDelivery` mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout for SMS gateway requests.
const SMS_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the SMS gateway.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP transport failure.
    #[error("sms request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the message.
    #[error("sms gateway error ({status}): {message}")]
    Gateway {
        /// HTTP status returned.
        status: u16,
        /// Gateway error message.
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    message: String,
}

/// HTTP client for the SMS gateway.
pub struct SmsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SmsClient {
    /// Create a new SMS client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(SMS_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Send an SMS message.
    pub async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let url = format!("{}/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest { to, message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: GatewayError = response.json().await.unwrap_or(GatewayError {
                message: String::new(),
            });
            return Err(SmsError::Gateway {
                status: status.as_u16(),
                message: body.message,
            });
        }

        tracing::debug!(to = %to, "SMS delivered");
        Ok(())
    }
}
