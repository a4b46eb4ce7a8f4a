//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `RISTRETTO_API_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `RISTRETTO_TOKEN` - Bearer token issued by the identity provider
//! - `RISTRETTO_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `RISTRETTO_DETAILS_CACHE_TTL_SECS` - Shop details cache TTL, 0 disables (default: 300)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Backend URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_url: Url,
    /// Bearer token, if the user is already signed in
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Shop details cache TTL (zero disables caching)
    pub details_cache_ttl: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("details_cache_ttl", &self.details_cache_ttl)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for `api_url` with default timeouts and no token.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            timeout: Duration::from_secs(10),
            details_cache_ttl: Duration::from_secs(300),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(
            "RISTRETTO_API_URL",
            &get_env_or_default("RISTRETTO_API_URL", DEFAULT_API_URL),
        )?;
        let token = get_optional_env("RISTRETTO_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let timeout = get_secs("RISTRETTO_TIMEOUT_SECS", 10)?;
        let details_cache_ttl = get_secs("RISTRETTO_DETAILS_CACHE_TTL_SECS", 300)?;

        Ok(Self {
            api_url,
            token,
            timeout,
            details_cache_ttl,
        })
    }
}

/// Parse and check a backend base URL.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is not an absolute
/// `http`/`https` URL that can carry a path.
pub fn parse_api_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be an http(s) URL (got {value})"),
        ));
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a duration in whole seconds with a default.
fn get_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_env_or_default(key, &default.to_string())
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_accepts_http() {
        let url = parse_api_url("X", "http://192.168.1.72:8080").unwrap();
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(matches!(
            parse_api_url("X", "mailto:someone@example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_api_url("X", "not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ClientConfig::new(Url::parse(DEFAULT_API_URL).unwrap());
        config.token = Some(SecretString::from("eyJhbGciOi.secret.sig"));
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("eyJhbGciOi"));
    }
}
