//! Configuration management for Flightdeck
//!
//! Configuration is loaded from environment variables.

use anyhow::{ensure, Context, Result};
use std::env;
use std::path::PathBuf;

/// Longest accepted response cache TTL (one year)
pub const MAX_CACHE_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Aviationstack API base URL
    pub aviationstack_api_url: String,
    /// Aviationstack access key (proxy answers 500 without it)
    pub aviationstack_api_key: Option<String>,

    /// Where the monthly usage record is persisted
    pub usage_file: PathBuf,
    /// Provider's hard monthly call cap
    pub monthly_call_limit: u32,
    /// Calls held back from the cap
    pub quota_safety_buffer: u32,

    /// Response cache TTL (in seconds)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached responses
    pub cache_max_entries: usize,

    /// Upstream request timeout (in seconds)
    pub upstream_timeout_seconds: u64,
    /// Whether a 2xx response carrying a provider error still counts against quota
    pub bill_embedded_errors: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env::var("FLIGHTDECK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("FLIGHTDECK_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid FLIGHTDECK_PORT")?,

            aviationstack_api_url: env::var("AVIATIONSTACK_API_URL")
                .unwrap_or_else(|_| "http://api.aviationstack.com/v1".to_string()),
            aviationstack_api_key: env::var("AVIATIONSTACK_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),

            usage_file: env::var("USAGE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("usage.json")),
            monthly_call_limit: env::var("MONTHLY_CALL_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid MONTHLY_CALL_LIMIT")?,
            quota_safety_buffer: env::var("QUOTA_SAFETY_BUFFER")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid QUOTA_SAFETY_BUFFER")?,

            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("Invalid CACHE_TTL_SECONDS")?,
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Invalid CACHE_MAX_ENTRIES")?,

            upstream_timeout_seconds: env::var("UPSTREAM_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("Invalid UPSTREAM_TIMEOUT_SECONDS")?,
            bill_embedded_errors: env::var("BILL_EMBEDDED_ERRORS")
                .map(|v| !(v == "false" || v == "0"))
                .unwrap_or(true),
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Reject values the cache and clock arithmetic cannot represent
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cache_ttl_seconds <= MAX_CACHE_TTL_SECONDS,
            "CACHE_TTL_SECONDS must be at most {} (got {})",
            MAX_CACHE_TTL_SECONDS,
            self.cache_ttl_seconds
        );
        Ok(())
    }

    /// Response cache TTL, clamped to [`MAX_CACHE_TTL_SECONDS`]
    pub fn cache_ttl(&self) -> chrono::Duration {
        let seconds = self.cache_ttl_seconds.min(MAX_CACHE_TTL_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    /// The threshold actually enforced: monthly cap minus the safety buffer
    pub fn effective_limit(&self) -> u32 {
        self.monthly_call_limit
            .saturating_sub(self.quota_safety_buffer)
    }
}
