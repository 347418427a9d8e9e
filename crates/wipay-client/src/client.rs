//! Wipay HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, IssueTokenRequest, IssueTokenResponse, ReportSummary, SubscriptionInfo,
};

/// Wipay API client.
///
/// Authenticates with the operator's JWT bearer token.
#[derive(Debug, Clone)]
pub struct WipayClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl WipayClient {
    /// Create a new Wipay client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the Wipay service (e.g., `"http://wipay:8080"`)
    /// * `bearer_token` - Operator JWT for authentication
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_options(base_url, bearer_token, ClientOptions::default())
    }

    /// Create a new Wipay client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        })
    }

    /// Issue a WiFi voucher.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::QuotaExceeded` when the monthly allowance is
    /// exhausted and `ClientError::NetworkNotConfigured` when no hotspot SSID
    /// is set, in addition to transport and generic API errors.
    pub async fn issue_token(
        &self,
        request: IssueTokenRequest,
    ) -> Result<IssueTokenResponse, ClientError> {
        let url = format!("{}/v1/tokens", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the operator's subscription state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_subscription(&self) -> Result<SubscriptionInfo, ClientError> {
        let url = format!("{}/v1/subscription", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch the sales summary for a predefined period ("week", "month",
    /// or "year").
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn report_summary(&self, period: &str) -> Result<ReportSummary, ClientError> {
        let url = format!("{}/v1/reports/summary", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("period", period)])
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match code {
                    "quota_exceeded" => {
                        let used = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("used"))
                            .and_then(serde_json::Value::as_u64)
                            .unwrap_or(0);
                        let limit = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("limit"))
                            .and_then(serde_json::Value::as_u64)
                            .unwrap_or(0);

                        #[allow(clippy::cast_possible_truncation)]
                        Err(ClientError::QuotaExceeded {
                            used: used as u32,
                            limit: limit as u32,
                        })
                    }
                    "payment_required" => Err(ClientError::PaymentRequired { message }),
                    "network_not_configured" => Err(ClientError::NetworkNotConfigured),
                    "not_found" => Err(ClientError::NotFound { message }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
