//! Common test utilities for wipay integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tempfile::TempDir;

use wipay_core::UserId;
use wipay_service::auth::JwtClaims;
use wipay_service::{create_router, AppState, ServiceConfig};
use wipay_store::{RocksStore, Store};

/// Secret used to sign test JWTs; matches the harness config.
pub const TEST_JWT_SECRET: &str = "wipay-test-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store handle for seeding state.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness after tweaking the default test configuration.
    pub fn with_config(tweak: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            jwt_secret: TEST_JWT_SECRET.into(),
            momo_webhook_secret: Some("momo-webhook-secret".into()),
            ..ServiceConfig::default()
        };
        tweak(&mut config);

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            test_user_id,
        }
    }

    /// Mint a signed JWT for the given user and role.
    pub fn mint_jwt(user_id: UserId, role: Option<&str>) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            role: role.map(String::from),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to mint test JWT")
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer {}", Self::mint_jwt(self.test_user_id, None))
    }

    /// Get an authorization header carrying the admin role.
    pub fn admin_auth_header(&self) -> String {
        format!(
            "Bearer {}",
            Self::mint_jwt(UserId::generate(), Some("admin"))
        )
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        format!("Bearer {}", Self::mint_jwt(UserId::generate(), None))
    }

    /// Register the test user's operator account.
    pub async fn register_account(&self) {
        self.server
            .post("/v1/accounts")
            .add_header("authorization", self.user_auth_header())
            .json(&serde_json::json!({
                "momo_number": "0920000001",
                "account_holder_name": "Test Operator"
            }))
            .await
            .assert_status_ok();
    }

    /// Configure the test user's hotspot SSID.
    pub async fn configure_network(&self) {
        self.server
            .put("/v1/network")
            .add_header("authorization", self.user_auth_header())
            .json(&serde_json::json!({ "ssid": "TestNet" }))
            .await
            .assert_status_ok();
    }

    /// Register, configure a network, and move the account to the given plan
    /// directly through the store (bypassing the MoMo charge).
    pub async fn seed_account_on_plan(&self, plan: wipay_core::Plan) {
        self.register_account().await;
        self.configure_network().await;

        let mut subscription = self
            .store
            .get_subscription(&self.test_user_id)
            .unwrap()
            .unwrap();
        subscription.plan = plan;
        self.store.put_subscription(&subscription).unwrap();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
