//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_API_URL` - Retail REST API base (default: `http://localhost:8080/rest/v1`)
//! - `SHOPFRONT_STORAGE_PATH` - Local storage file (default: `.shopfront/storage.json`)
//! - `SHOPFRONT_TOAST_DURATION_MS` - Default toast lifetime (default: 3000)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/rest/v1";
const DEFAULT_STORAGE_PATH: &str = ".shopfront/storage.json";
const DEFAULT_TOAST_DURATION_MS: u64 = 3000;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the retail REST API (ends in `/rest/v1`)
    pub api_url: Url,
    /// JSON file backing local storage
    pub storage_path: PathBuf,
    /// Lifetime of toasts created without an explicit duration
    pub toast_duration: Duration,
    /// How long catalog lookups stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 - 1.0)
    pub sentry_sample_rate: f32,
}

impl StorefrontConfig {
    /// Create a configuration for the given API base URL with default settings.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e))?;
        let storage_path =
            PathBuf::from(get_env_or_default("SHOPFRONT_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let toast_duration = Duration::from_millis(get_parsed_env(
            "SHOPFRONT_TOAST_DURATION_MS",
            DEFAULT_TOAST_DURATION_MS,
        )?);
        let catalog_cache_ttl = Duration::from_secs(get_parsed_env(
            "SHOPFRONT_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);
        let sentry_sample_rate = get_parsed_env("SENTRY_SAMPLE_RATE", 1.0_f32)?;
        if !(0.0..=1.0).contains(&sentry_sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                format!("must be between 0.0 and 1.0 (got {sentry_sample_rate})"),
            ));
        }

        Ok(Self {
            storage_path,
            toast_duration,
            catalog_cache_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            ..Self::new(api_url)
        })
    }

    /// Return a copy pointing at a different API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e))?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an API base URL. Only `http` and `https` are accepted.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{other}'")),
    }
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get and parse an environment variable, falling back to a default when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
