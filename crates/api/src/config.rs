//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AIRTABLE_API_KEY` - Airtable personal access token
//! - `AIRTABLE_BASE_ID` - Tenant base ID (e.g., `appXXXXXXXXXXXXXX`)
//! - `JWT_SECRET` - Access-token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8000)
//! - `AIRTABLE_API_URL` - Records API base URL (default: Airtable's)
//! - `AIRTABLE_TABLE_AUCTION` / `_BIN` / `_RETAIL` / `_CATALOGUE` / `_REPAIR`
//!   - Channel table name overrides
//! - `AIRTABLE_TABLE_USERS` - Users table (default: Users)
//! - `AIRTABLE_TABLE_HISTORY` - Scan history table (default: Scan History)
//! - `AIRTABLE_TABLE_SETTINGS` - Settings table (default: Settings)
//! - `ACCESS_TOKEN_EXPIRE_MINUTES` - JWT lifetime (default: 60)
//! - `UPCITEMDB_API_KEY` - UPCItemDB lookup provider key
//! - `BARCODELOOKUP_API_KEY` - BarcodeLookup.com provider key
//! - `OPENFOODFACTS_ENABLED` - Enable the Open Food Facts provider ("1"/"true")
//! - `HTTP_TIMEOUT_SECS` - Outbound HTTP timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use stocklink_core::Channel;
use thiserror::Error;

const MIN_SIGNING_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default Airtable records API base URL.
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Inventory API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Airtable connection configuration
    pub airtable: AirtableConfig,
    /// Token issuing configuration
    pub auth: AuthConfig,
    /// Barcode lookup provider configuration
    pub providers: ProviderConfig,
    /// Outbound HTTP timeout
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Airtable connection configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AirtableConfig {
    /// Records API base URL (overridable for tests)
    pub api_url: String,
    /// Personal access token
    pub api_key: SecretString,
    /// Tenant base ID
    pub base_id: String,
    /// Channel table names, keyed by [`Channel`]
    pub channel_tables: HashMap<Channel, String>,
    /// Users table name
    pub users_table: String,
    /// Scan history table name
    pub history_table: String,
    /// Settings table name
    pub settings_table: String,
}

impl AirtableConfig {
    /// The Airtable table name backing a channel.
    #[must_use]
    pub fn table_for(&self, channel: Channel) -> &str {
        self.channel_tables
            .get(&channel)
            .map_or_else(|| channel.default_table_name(), String::as_str)
    }
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .field("channel_tables", &self.channel_tables)
            .field("users_table", &self.users_table)
            .field("history_table", &self.history_table)
            .field("settings_table", &self.settings_table)
            .finish()
    }
}

/// Token issuing configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: SecretString,
    /// Access token lifetime
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Barcode lookup provider configuration.
///
/// Every provider is optional; the resolver skips providers that are not
/// configured and falls through to the next one in the chain.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    /// UPCItemDB API key
    pub upcitemdb_api_key: Option<SecretString>,
    /// BarcodeLookup.com API key
    pub barcodelookup_api_key: Option<SecretString>,
    /// Whether the keyless Open Food Facts provider is enabled
    pub openfoodfacts_enabled: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field(
                "upcitemdb_api_key",
                &self.upcitemdb_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "barcodelookup_api_key",
                &self.barcodelookup_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openfoodfacts_enabled", &self.openfoodfacts_enabled)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let airtable = AirtableConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let providers = ProviderConfig::from_env();

        let http_timeout = get_env_or_default("HTTP_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            airtable,
            auth,
            providers,
            http_timeout,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AirtableConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut channel_tables = HashMap::new();
        for channel in Channel::ALL {
            let var = format!("AIRTABLE_TABLE_{}", channel.as_str().to_uppercase());
            let table = get_env_or_default(&var, channel.default_table_name());
            channel_tables.insert(channel, table);
        }

        Ok(Self {
            api_url: get_env_or_default("AIRTABLE_API_URL", AIRTABLE_API_URL),
            api_key: get_required_secret("AIRTABLE_API_KEY")?,
            base_id: get_required_env("AIRTABLE_BASE_ID")?,
            channel_tables,
            users_table: get_env_or_default("AIRTABLE_TABLE_USERS", "Users"),
            history_table: get_env_or_default("AIRTABLE_TABLE_HISTORY", "Scan History"),
            settings_table: get_env_or_default("AIRTABLE_TABLE_SETTINGS", "Settings"),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("JWT_SECRET")?;
        validate_signing_secret(&jwt_secret, "JWT_SECRET")?;

        let token_ttl = get_env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "60")
            .parse::<u64>()
            .map(|minutes| Duration::from_secs(minutes * 60))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ACCESS_TOKEN_EXPIRE_MINUTES".to_string(), e.to_string())
            })?;

        Ok(Self {
            jwt_secret,
            token_ttl,
        })
    }
}

impl ProviderConfig {
    fn from_env() -> Self {
        Self {
            upcitemdb_api_key: get_optional_env("UPCITEMDB_API_KEY").map(SecretString::from),
            barcodelookup_api_key: get_optional_env("BARCODELOOKUP_API_KEY")
                .map(SecretString::from),
            openfoodfacts_enabled: matches!(
                get_env_or_default("OPENFOODFACTS_ENABLED", "0").as_str(),
                "1" | "true" | "yes"
            ),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_signing_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SIGNING_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SIGNING_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_airtable_config() -> AirtableConfig {
        AirtableConfig {
            api_url: AIRTABLE_API_URL.to_string(),
            api_key: SecretString::from("patAbCdEf0123456789"),
            base_id: "appTESTTESTTESTTE".to_string(),
            channel_tables: HashMap::new(),
            users_table: "Users".to_string(),
            history_table: "Scan History".to_string(),
            settings_table: "Settings".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_signing_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_signing_secret(&secret, "TEST_SIGNING");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_signing_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_signing_secret(&secret, "TEST_SIGNING");
        assert!(result.is_ok());
    }

    #[test]
    fn test_table_for_falls_back_to_default() {
        let config = test_airtable_config();
        assert_eq!(config.table_for(Channel::Retail), "Items-Retail");
    }

    #[test]
    fn test_table_for_uses_override() {
        let mut config = test_airtable_config();
        config
            .channel_tables
            .insert(Channel::Retail, "Items-Pay4more".to_string());
        assert_eq!(config.table_for(Channel::Retail), "Items-Pay4more");
    }

    #[test]
    fn test_airtable_config_debug_redacts_secrets() {
        let config = test_airtable_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("appTESTTESTTESTTE"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("patAbCdEf0123456789"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            airtable: test_airtable_config(),
            auth: AuthConfig {
                jwt_secret: SecretString::from("x".repeat(32)),
                token_ttl: Duration::from_secs(3600),
            },
            providers: ProviderConfig::default(),
            http_timeout: Duration::from_secs(15),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }
}
