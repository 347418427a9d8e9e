//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, admin, health, invoices, reports, subscription, tokens, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests for voucher endpoints.
/// Operators issue vouchers in bursts at peak hours.
const TOKEN_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (JWT auth)
/// - `POST /v1/accounts` - Register operator account
/// - `GET /v1/accounts/me` - Get current operator's account
/// - `PUT /v1/network` - Configure hotspot SSID
///
/// ## Vouchers (JWT auth, concurrency-limited)
/// - `POST /v1/tokens` - Issue a voucher
/// - `GET /v1/tokens` - List vouchers
/// - `POST /v1/tokens/:id/deactivate` - Deactivate a voucher
/// - `POST /v1/tokens/:id/resend` - Re-send credentials SMS
///
/// ## Subscription (JWT auth)
/// - `GET /v1/subscription` - Plan, usage, remaining allowance
/// - `POST /v1/subscription/change-plan` - Switch plan (MoMo charge)
///
/// ## Invoices (JWT auth)
/// - `POST /v1/invoices` - Create an invoice
/// - `GET /v1/invoices` - List invoices with aging buckets
/// - `POST /v1/invoices/:id/payments` - Record a payment
/// - `POST /v1/invoices/:id/reminders` - Record a reminder
///
/// ## Reports (JWT auth)
/// - `GET /v1/reports/summary` - Sales aggregation
///
/// ## Admin (JWT with admin role)
/// - `POST /v1/admin/bulk` - Bulk account actions
///
/// ## Webhooks (HMAC signature verification)
/// - `POST /webhooks/momo` - MTN MoMo payment callbacks
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Voucher routes carry their own concurrency limit; issuance bursts must
    // not starve the rest of the API.
    let token_routes = Router::new()
        .route("/", post(tokens::issue_token).get(tokens::list_tokens))
        .route("/:id/deactivate", post(tokens::deactivate_token))
        .route("/:id/resend", post(tokens::resend_sms))
        .layer(ConcurrencyLimitLayer::new(TOKEN_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/me", get(accounts::get_account))
        .route("/network", put(accounts::set_network))
        // Subscription
        .route("/subscription", get(subscription::get_subscription))
        .route(
            "/subscription/change-plan",
            post(subscription::change_plan),
        )
        // Invoices
        .route(
            "/invoices",
            post(invoices::create_invoice).get(invoices::list_invoices),
        )
        .route("/invoices/:id/payments", post(invoices::record_payment))
        .route("/invoices/:id/reminders", post(invoices::record_reminder))
        // Reports
        .route("/reports/summary", get(reports::report_summary))
        // Admin
        .route("/admin/bulk", post(admin::bulk_action))
        // Voucher routes (with their own concurrency limit)
        .nest("/tokens", token_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Webhooks (no rate limit - controlled by external services)
        .route("/webhooks/momo", post(webhooks::momo_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
