//! Voucher issuance and lifecycle integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;
use wipay_core::Plan;

fn issue_body() -> serde_json::Value {
    json!({
        "recipient_phone": "0925551234",
        "duration_hours": 3,
        "payment_method": "cash"
    })
}

// ============================================================================
// Issuance
// ============================================================================

#[tokio::test]
async fn issue_token_success() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["token"]["duration_hours"], 3);
    assert_eq!(body["token"]["price"], 250);
    assert_eq!(body["token"]["currency"], "SSP");
    assert_eq!(body["token"]["recipient_phone"], "+211925551234");
    assert!(body["token"]["username"]
        .as_str()
        .unwrap()
        .starts_with("wifi_"));
    assert_eq!(body["token"]["password"].as_str().unwrap().len(), 12);
    // Free plan: delivery is simulated but reported as delivered
    assert_eq!(body["sms_delivered"], true);
    assert_eq!(body["sms_simulated"], true);
    assert_eq!(body["tokens_remaining"], 9);
}

#[tokio::test]
async fn issue_token_requires_network() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;

    response.assert_status(StatusCode::PRECONDITION_FAILED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "network_not_configured");
}

#[tokio::test]
async fn issue_token_rejects_unsupported_duration() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "recipient_phone": "0925551234",
            "duration_hours": 2,
            "payment_method": "cash"
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn issue_token_enforces_monthly_quota() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    // Free plan allows 10 vouchers per month
    for _ in 0..10 {
        harness
            .server
            .post("/v1/tokens")
            .add_header("authorization", harness.user_auth_header())
            .json(&issue_body())
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "quota_exceeded");
    assert_eq!(body["error"]["details"]["used"], 10);
    assert_eq!(body["error"]["details"]["limit"], 10);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn list_tokens_newest_first() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    for hours in [1, 3, 6] {
        harness
            .server
            .post("/v1/tokens")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({
                "recipient_phone": "0925551234",
                "duration_hours": hours,
                "payment_method": "cash"
            }))
            .await
            .assert_status_ok();
        // ULIDs order by millisecond; keep issuances apart
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let response = harness
        .server
        .get("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let tokens = body["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0]["duration_hours"], 6); // Newest first
    assert_eq!(tokens[2]["duration_hours"], 1);
}

#[tokio::test]
async fn list_tokens_is_isolated_per_user() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/tokens")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tokens"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Deactivation and Resend
// ============================================================================

#[tokio::test]
async fn deactivate_token_is_persisted() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;
    let token_id = response.json::<serde_json::Value>()["token"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = harness
        .server
        .post(&format!("/v1/tokens/{token_id}/deactivate"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_active"], false);
    assert_eq!(body["status"], "expired");

    // Still deactivated on a fresh read
    let response = harness
        .server
        .get("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["tokens"][0]["is_active"], false);
}

#[tokio::test]
async fn deactivate_other_users_token_reads_as_not_found() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;
    let token_id = response.json::<serde_json::Value>()["token"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = harness
        .server
        .post(&format!("/v1/tokens/{token_id}/deactivate"))
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn resend_sms_bumps_resend_count() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;
    let token_id = response.json::<serde_json::Value>()["token"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = harness
        .server
        .post(&format!("/v1/tokens/{token_id}/resend"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // Issuance counted as the first send; this is resend number one
    assert_eq!(body["token"]["sms_resend_count"], 1);
    assert_eq!(body["sms_simulated"], true);
}

#[tokio::test]
async fn resend_on_deactivated_token_fails() {
    let harness = TestHarness::new();
    harness.seed_account_on_plan(Plan::Basic).await;

    let response = harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&issue_body())
        .await;
    let token_id = response.json::<serde_json::Value>()["token"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    harness
        .server
        .post(&format!("/v1/tokens/{token_id}/deactivate"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post(&format!("/v1/tokens/{token_id}/resend"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status(StatusCode::CONFLICT);
}
