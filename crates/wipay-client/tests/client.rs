//! Wiremock-backed client SDK tests.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wipay_client::{ClientError, IssueTokenRequest, WipayClient};
use wipay_core::PaymentMethod;

fn issue_request() -> IssueTokenRequest {
    IssueTokenRequest {
        recipient_phone: "0925551234".to_string(),
        duration_hours: 3,
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
async fn issue_token_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .and(header("authorization", "Bearer operator-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": {
                "id": "01J8ZQ7V9GJ3W9T0X3N5B6C7D8",
                "recipient_phone": "+211925551234",
                "duration_hours": 3,
                "price": 250,
                "currency": "SSP",
                "payment_method": "cash",
                "status": "active",
                "username": "wifi_a1b2c3d4",
                "password": "x1y2z3a4b5c6",
                "is_active": true,
                "created_at": "2026-08-30T10:00:00Z",
                "expires_at": "2026-08-30T13:00:00Z",
                "sms_resend_count": 0
            },
            "sms_delivered": true,
            "sms_simulated": false,
            "tokens_remaining": 99
        })))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let issued = client.issue_token(issue_request()).await.unwrap();

    assert_eq!(issued.token.price, 250);
    assert_eq!(issued.token.username, "wifi_a1b2c3d4");
    assert!(issued.sms_delivered);
    assert_eq!(issued.tokens_remaining, 99);
}

#[tokio::test]
async fn quota_exceeded_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": "quota_exceeded",
                "message": "token quota exceeded: used=10, limit=10",
                "details": { "used": 10, "limit": 10 }
            }
        })))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let err = client.issue_token(issue_request()).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::QuotaExceeded { used: 10, limit: 10 }
    ));
}

#[tokio::test]
async fn network_not_configured_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(ResponseTemplate::new(412).set_body_json(json!({
            "error": {
                "code": "network_not_configured",
                "message": "Configure your WiFi network before issuing vouchers"
            }
        })))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let err = client.issue_token(issue_request()).await.unwrap_err();

    assert!(matches!(err, ClientError::NetworkNotConfigured));
}

#[tokio::test]
async fn get_subscription_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plan": "basic",
            "monthly_price": 5000,
            "status": "active",
            "tokens_used_this_month": 42,
            "monthly_token_quota": 100,
            "tokens_remaining": 58,
            "real_sms": true,
            "advanced_reports": false
        })))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let subscription = client.get_subscription().await.unwrap();

    assert_eq!(subscription.plan, "basic");
    assert_eq!(subscription.tokens_remaining, 58);
    assert!(subscription.real_sms);
}

#[tokio::test]
async fn report_summary_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/summary"))
        .and(query_param("period", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "start": "2026-08-23T10:00:00Z",
            "end": "2026-08-30T10:00:00Z",
            "revenue": 600,
            "transactions": 3,
            "unique_customers": 2,
            "avg_transaction_value": 200.0,
            "by_duration": { "1": { "count": 1, "revenue": 100 } },
            "by_method": { "cash": { "count": 3, "revenue": 600 } },
            "recent": [],
            "table": { "title": "Sales", "headers": [], "rows": [] }
        })))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let summary = client.report_summary("week").await.unwrap();

    assert_eq!(summary.revenue, 600);
    assert_eq!(summary.unique_customers, 2);
    assert_eq!(summary.by_method["cash"].count, 3);
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscription"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = WipayClient::new(server.uri(), "operator-jwt").unwrap();
    let err = client.get_subscription().await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, .. }));
}
