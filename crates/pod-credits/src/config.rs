//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use payment_flow::FlowConfig;
use podcore_client::PaymentVendor;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Podcore backend configuration
    #[serde(default)]
    pub podcore: PodcoreConfig,

    /// Local session storage configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Reconciliation workflow timing
    #[serde(default)]
    pub flow: FlowConfig,

    /// App configuration
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodcoreConfig {
    /// Podcore REST API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the persisted session file
    #[serde(default = "default_session_path")]
    pub storage_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Payment vendor used when starting a payment
    #[serde(default = "default_vendor")]
    pub vendor: PaymentVendor,

    /// Start a payment automatically when a balance is owed
    #[serde(default)]
    pub auto_pay: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PodcoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_session_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            auto_pay: false,
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "https://stagingv3.leapmile.com/podcore".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_vendor() -> PaymentVendor {
    PaymentVendor::Razorpay
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Phone numbers like +16504928286 must stay strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
