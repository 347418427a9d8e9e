//! Report integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use wipay_core::Plan;

async fn issue(harness: &TestHarness, hours: u32, phone: &str) {
    harness
        .server
        .post("/v1/tokens")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "recipient_phone": phone,
            "duration_hours": hours,
            "payment_method": "cash"
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn weekly_summary_aggregates_sales() {
    let harness = TestHarness::new();
    harness.register_account().await;
    harness.configure_network().await;

    issue(&harness, 1, "0925551111").await; // 100 SSP
    issue(&harness, 3, "0925552222").await; // 250 SSP
    issue(&harness, 3, "0925551111").await; // 250 SSP, repeat buyer

    let response = harness
        .server
        .get("/v1/reports/summary?period=week")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["revenue"], 600);
    assert_eq!(body["transactions"], 3);
    assert_eq!(body["unique_customers"], 2);
    assert_eq!(body["avg_transaction_value"], 200.0);
    assert_eq!(body["by_duration"]["1"]["count"], 1);
    assert_eq!(body["by_duration"]["3"]["revenue"], 500);
    assert_eq!(body["by_method"]["cash"]["count"], 3);
    assert_eq!(body["recent"].as_array().unwrap().len(), 3);

    // Tabular export includes a total row
    let rows = body["table"]["rows"].as_array().unwrap();
    let total = rows.last().unwrap().as_array().unwrap();
    assert_eq!(total[0], "Total");
    assert_eq!(total[2], "600");
}

#[tokio::test]
async fn empty_period_reports_zeroes() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .get("/v1/reports/summary?period=month")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["revenue"], 0);
    assert_eq!(body["transactions"], 0);
    assert_eq!(body["avg_transaction_value"], 0.0);
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let harness = TestHarness::new();
    harness.register_account().await;

    let response = harness
        .server
        .get("/v1/reports/summary?period=quarter")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn custom_range_requires_advanced_reports() {
    let harness = TestHarness::new();
    harness.register_account().await;

    // Free plan cannot use custom ranges
    let response = harness
        .server
        .get("/v1/reports/summary?start=2026-08-01T00:00:00Z&end=2026-08-15T00:00:00Z")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn custom_range_allowed_on_pro_plan() {
    let harness = TestHarness::new();
    harness.seed_account_on_plan(Plan::Pro).await;

    issue(&harness, 6, "0925551111").await;

    let response = harness
        .server
        .get("/v1/reports/summary?start=2020-01-01T00:00:00Z&end=2030-01-01T00:00:00Z")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"], 1);
    assert_eq!(body["revenue"], 400);
}

#[tokio::test]
async fn custom_range_with_end_before_start_is_rejected() {
    let harness = TestHarness::new();
    harness.seed_account_on_plan(Plan::Pro).await;

    let response = harness
        .server
        .get("/v1/reports/summary?start=2026-08-15T00:00:00Z&end=2026-08-01T00:00:00Z")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
}
