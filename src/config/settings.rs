//! # Configuration Settings
//!
//! Defines the configuration structure for the note store client.

use crate::errors::{NoteError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Ordered direct-protocol store URLs, tried first to last
    #[validate(length(min = 1, message = "At least one store URL is required"))]
    pub store_urls: Vec<String>,

    /// Optional REST bridge descriptor for the HTTP store family
    #[validate(nested)]
    pub rest: Option<RestConfig>,

    /// Default note lifetime in seconds
    #[validate(range(
        min = 1,
        max = 2_592_000,
        message = "Default TTL must be between 1 second and 30 days"
    ))]
    pub default_ttl_seconds: u64,

    /// Default read budget for new notes
    #[validate(range(min = 1, message = "Default read budget must be at least 1"))]
    pub default_max_reads: u32,

    /// Per-operation store timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Store timeout must be between 1 and 300 seconds"
    ))]
    pub store_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_urls: vec![
                "redis://127.0.0.1:6379".to_string(),
                "redis://127.0.0.1:6380".to_string(),
            ],
            rest: None,
            default_ttl_seconds: 3600, // 1 hour
            default_max_reads: 1,
            store_timeout_seconds: 5,
        }
    }
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| NoteError::config(e.to_string()))?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        for url in &self.store_urls {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(NoteError::config(format!(
                    "Store URL '{}' must start with 'redis://' or 'rediss://'",
                    url
                )));
            }
        }

        if let Some(rest) = &self.rest {
            if !rest.base_url.starts_with("http://") && !rest.base_url.starts_with("https://") {
                return Err(NoteError::config(
                    "REST base URL must start with 'http://' or 'https://'",
                ));
            }
        }

        Ok(())
    }

    /// Get per-operation store timeout as Duration
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }

    /// Create configuration from environment variables
    ///
    /// Missing variables fall back to defaults; present but unparseable
    /// values are configuration errors rather than silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let store_urls = match std::env::var("SEALNOTE_STORE_URLS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.store_urls,
        };

        let rest = match (
            std::env::var("SEALNOTE_REST_URL"),
            std::env::var("SEALNOTE_REST_TOKEN"),
        ) {
            (Ok(base_url), Ok(token)) => Some(RestConfig { base_url, token }),
            (Err(_), Err(_)) => None,
            _ => {
                return Err(NoteError::config(
                    "SEALNOTE_REST_URL and SEALNOTE_REST_TOKEN must be set together",
                ))
            }
        };

        let config = Self {
            store_urls,
            rest,
            default_ttl_seconds: parse_env("SEALNOTE_DEFAULT_TTL_SECS", defaults.default_ttl_seconds)?,
            default_max_reads: parse_env("SEALNOTE_DEFAULT_READS", defaults.default_max_reads)?,
            store_timeout_seconds: parse_env(
                "SEALNOTE_STORE_TIMEOUT_SECS",
                defaults.store_timeout_seconds,
            )?,
        };

        config.validate()?;
        Ok(config)
    }
}

/// REST bridge configuration (base URL plus bearer token)
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RestConfig {
    /// Bridge base URL, no trailing slash required
    #[validate(length(min = 1, message = "REST base URL cannot be empty"))]
    pub base_url: String,

    /// Bearer token presented on every request
    #[validate(length(min = 1, message = "REST token cannot be empty"))]
    #[serde(serialize_with = "serialize_redacted")]
    pub token: String,
}

// The bearer token must never reach logs or serialized output.
impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn serialize_redacted<S: Serializer>(_token: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| NoteError::config(format!("Invalid value for {}: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
