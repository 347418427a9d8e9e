//! Admin bulk-action integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use wipay_core::UserId;

#[tokio::test]
async fn bulk_requires_admin_role() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "user_ids": [harness.test_user_id.to_string()],
            "action": "suspend"
        }))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn suspend_then_activate_round_trips() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "user_ids": [harness.test_user_id.to_string()],
            "action": "suspend"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], 1);
    assert_eq!(body["failed"], 0);

    let response = harness
        .server
        .get("/v1/subscription")
        .add_header("authorization", harness.user_auth_header())
        .await;
    assert_eq!(response.json::<serde_json::Value>()["status"], "past_due");

    harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "user_ids": [harness.test_user_id.to_string()],
            "action": "activate"
        }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/subscription")
        .add_header("authorization", harness.user_auth_header())
        .await;
    assert_eq!(response.json::<serde_json::Value>()["status"], "active");
}

#[tokio::test]
async fn missing_account_fails_whole_batch() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "user_ids": [
                harness.test_user_id.to_string(),
                UserId::generate().to_string()
            ],
            "action": "suspend"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], 0);
    assert_eq!(body["failed"], 2);

    // The existing account was not touched
    let response = harness
        .server
        .get("/v1/subscription")
        .add_header("authorization", harness.user_auth_header())
        .await;
    assert_eq!(response.json::<serde_json::Value>()["status"], "active");
}

#[tokio::test]
async fn update_plan_switches_and_resets_usage() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "recipient_phone": "0925551234",
            "duration_hours": 1,
            "payment_method": "cash"
        }))
        .await
        .assert_status_ok();

    harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "user_ids": [harness.test_user_id.to_string()],
            "action": "update_plan",
            "plan": "enterprise"
        }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/subscription")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "enterprise");
    assert_eq!(body["tokens_used_this_month"], 0);
    assert_eq!(body["monthly_token_quota"], -1);
}

#[tokio::test]
async fn empty_user_list_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/bulk")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({ "user_ids": [], "action": "suspend" }))
        .await;

    response.assert_status_bad_request();
}
