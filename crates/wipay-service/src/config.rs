//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use wipay_core::PricingConfig;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/wipay").
    pub data_dir: String,

    /// HS256 secret used to verify JWT bearer tokens.
    pub jwt_secret: String,

    /// SMS gateway base URL (optional; delivery is simulated without it).
    pub sms_api_url: Option<String>,

    /// SMS gateway API key (optional).
    pub sms_api_key: Option<String>,

    /// MTN MoMo collections API base URL (optional).
    pub momo_api_url: Option<String>,

    /// MTN MoMo API key (optional).
    pub momo_api_key: Option<String>,

    /// MTN MoMo webhook signing secret (optional).
    pub momo_webhook_secret: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Voucher pricing table.
    pub pricing: PricingConfig,
}

/// MoMo secrets file structure.
#[derive(Debug, Deserialize)]
struct MomoSecrets {
    api_url: String,
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load MoMo secrets from file first, then fall back to env vars
        let (momo_api_url, momo_api_key, momo_webhook_secret) = load_momo_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/wipay".into()),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set - using development secret");
                "wipay-dev-secret".into()
            }),
            sms_api_url: std::env::var("SMS_API_URL").ok(),
            sms_api_key: std::env::var("SMS_API_KEY").ok(),
            momo_api_url,
            momo_api_key,
            momo_webhook_secret,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            pricing: PricingConfig::default(),
        }
    }
}

/// Load MoMo secrets from file or environment.
fn load_momo_secrets() -> (Option<String>, Option<String>, Option<String>) {
    // Try multiple paths for the secrets file
    let secret_paths = [
        ".secrets/momo.json",
        "wipay/.secrets/momo.json",
        "../.secrets/momo.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<MomoSecrets>(path) {
            tracing::info!(path = %path, "Loaded MoMo secrets from file");
            return (
                Some(secrets.api_url),
                Some(secrets.api_key),
                secrets.webhook_secret,
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("MoMo secrets file not found, using environment variables");
    (
        std::env::var("MOMO_API_URL").ok(),
        std::env::var("MOMO_API_KEY").ok(),
        std::env::var("MOMO_WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/wipay".into(),
            jwt_secret: "wipay-dev-secret".into(),
            sms_api_url: None,
            sms_api_key: None,
            momo_api_url: None,
            momo_api_key: None,
            momo_webhook_secret: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            pricing: PricingConfig::default(),
        }
    }
}
