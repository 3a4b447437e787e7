//! Sync service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AIRTABLE_API_KEY` - Airtable personal access token
//! - `AIRTABLE_BASE_ID` - Tenant base ID
//! - `WOO_URL` - WooCommerce store base URL (e.g., `https://shop.example.com`)
//! - `WOO_CONSUMER_KEY` / `WOO_CONSUMER_SECRET` - WooCommerce REST credentials
//!
//! ## Optional
//! - `SYNC_HOST` - Bind address (default: 127.0.0.1)
//! - `SYNC_PORT` - Listen port (default: 5000)
//! - `AIRTABLE_API_URL` - Records API base URL (default: Airtable's)
//! - `AIRTABLE_TABLE_NAME` - Synced products table (default: Products)
//! - `WEBHOOK_SECRET` - Shared secret for webhook signatures; verification
//!   is skipped entirely when unset
//! - `SYNC_TTL_SECONDS` - Echo suppression window (default: 30)
//! - `HTTP_TIMEOUT_SECS` - Outbound HTTP timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Default Airtable records API base URL.
const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Sync service configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Airtable connection configuration
    pub airtable: AirtableSyncConfig,
    /// WooCommerce connection configuration
    pub woo: WooConfig,
    /// Shared secret for webhook signature verification
    pub webhook_secret: Option<SecretString>,
    /// Echo suppression window for the sync tracker
    pub sync_ttl: Duration,
    /// Outbound HTTP timeout
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Airtable side of the sync.
#[derive(Clone)]
pub struct AirtableSyncConfig {
    /// Records API base URL (overridable for tests)
    pub api_url: String,
    /// Personal access token
    pub api_key: SecretString,
    /// Tenant base ID
    pub base_id: String,
    /// The products table kept in sync
    pub table: String,
}

impl std::fmt::Debug for AirtableSyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableSyncConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .finish()
    }
}

/// WooCommerce REST API connection.
#[derive(Clone)]
pub struct WooConfig {
    /// Store base URL, without the API path
    pub url: String,
    /// REST API consumer key
    pub consumer_key: SecretString,
    /// REST API consumer secret
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for WooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooConfig")
            .field("url", &self.url)
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SYNC_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SYNC_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SYNC_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SYNC_PORT".to_string(), e.to_string()))?;

        let airtable = AirtableSyncConfig {
            api_url: get_env_or_default("AIRTABLE_API_URL", AIRTABLE_API_URL),
            api_key: SecretString::from(get_required_env("AIRTABLE_API_KEY")?),
            base_id: get_required_env("AIRTABLE_BASE_ID")?,
            table: get_env_or_default("AIRTABLE_TABLE_NAME", "Products"),
        };

        let woo = WooConfig {
            url: get_required_env("WOO_URL")?
                .trim_end_matches('/')
                .to_string(),
            consumer_key: SecretString::from(get_required_env("WOO_CONSUMER_KEY")?),
            consumer_secret: SecretString::from(get_required_env("WOO_CONSUMER_SECRET")?),
        };

        let sync_ttl = get_env_or_default("SYNC_TTL_SECONDS", "30")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SYNC_TTL_SECONDS".to_string(), e.to_string())
            })?;

        let http_timeout = get_env_or_default("HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            airtable,
            woo,
            webhook_secret: std::env::var("WEBHOOK_SECRET").ok().map(SecretString::from),
            sync_ttl,
            http_timeout,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
