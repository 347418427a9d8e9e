//! MTN MoMo collections client.
//!
//! Plan-change charges go through the MoMo "request to pay" flow: the service
//! submits a charge against the operator's registered MoMo number and the
//! gateway answers synchronously for sandbox accounts or via the webhook for
//! production ones. Failed charges surface as a failed `PaymentResult`, not
//! as an error; only transport problems are errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wipay_core::PaymentResult;

/// Timeout for MoMo gateway requests.
const MOMO_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the MoMo gateway.
#[derive(Debug, thiserror::Error)]
pub enum MomoError {
    /// HTTP transport failure.
    #[error("momo request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned an unexpected response.
    #[error("momo gateway error ({status}): {message}")]
    Gateway {
        /// HTTP status returned.
        status: u16,
        /// Gateway error message.
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct RequestToPay<'a> {
    amount: String,
    currency: &'a str,
    #[serde(rename = "externalId")]
    external_id: String,
    payer: Payer<'a>,
    #[serde(rename = "payerMessage")]
    payer_message: &'a str,
}

#[derive(Debug, Serialize)]
struct Payer<'a> {
    #[serde(rename = "partyIdType")]
    party_id_type: &'static str,
    #[serde(rename = "partyId")]
    party_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: String,
    #[serde(rename = "financialTransactionId", default)]
    financial_transaction_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// HTTP client for the MTN MoMo collections API.
pub struct MomoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MomoClient {
    /// Create a new MoMo client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, MomoError> {
        let client = reqwest::Client::builder()
            .timeout(MOMO_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Charge a MoMo number.
    ///
    /// Returns a `PaymentResult` describing the charge outcome. A declined
    /// charge is a successful call with `success: false`.
    pub async fn charge(
        &self,
        momo_number: &str,
        amount: i64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentResult, MomoError> {
        let url = format!("{}/collection/v1_0/requesttopay", self.base_url);
        let external_id = Uuid::new_v4().to_string();

        let body = RequestToPay {
            amount: amount.to_string(),
            currency,
            external_id: external_id.clone(),
            payer: Payer {
                party_id_type: "MSISDN",
                party_id: momo_number,
            },
            payer_message: description,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Reference-Id", &external_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MomoError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let charge: ChargeResponse = response.json().await?;

        tracing::info!(
            momo_number = %momo_number,
            amount = %amount,
            status = %charge.status,
            "MoMo charge completed"
        );

        if charge.status == "SUCCESSFUL" {
            Ok(PaymentResult::succeeded(
                charge.financial_transaction_id.unwrap_or(external_id),
            ))
        } else {
            Ok(PaymentResult::failed(
                charge.reason.unwrap_or_else(|| charge.status.clone()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_charge_maps_to_payment_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collection/v1_0/requesttopay"))
            .and(header_exists("X-Reference-Id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "SUCCESSFUL",
                "financialTransactionId": "ft-123"
            })))
            .mount(&server)
            .await;

        let client = MomoClient::new(&server.uri(), "key").unwrap();
        let result = client
            .charge("+211920000001", 5_000, "SSP", "Wipay Basic plan")
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.reference_id.as_deref(), Some("ft-123"));
    }

    #[tokio::test]
    async fn declined_charge_is_a_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collection/v1_0/requesttopay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "FAILED",
                "reason": "PAYER_LIMIT_REACHED"
            })))
            .mount(&server)
            .await;

        let client = MomoClient::new(&server.uri(), "key").unwrap();
        let result = client
            .charge("+211920000001", 15_000, "SSP", "Wipay Pro plan")
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("PAYER_LIMIT_REACHED"));
    }

    #[tokio::test]
    async fn gateway_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = MomoClient::new(&server.uri(), "key").unwrap();
        let err = client
            .charge("+211920000001", 5_000, "SSP", "charge")
            .await
            .unwrap_err();
        assert!(matches!(err, MomoError::Gateway { status: 500, .. }));
    }
}
