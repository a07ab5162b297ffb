//! # Application Configuration
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config <path>`)
//! 3. `DATAPULSE_*` environment variables
//!
//! No core logic depends on where a setting came from.

use datapulse_core::DatapulseError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// SETTINGS
// =============================================================================

/// Top-level application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Human-readable service name, reported by health and root endpoints.
    pub app_name: String,
    /// Host the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Comma-separated allowed CORS origins, or "*" for all.
    /// Unset means localhost only.
    pub cors_origins: Option<String>,
    /// Global requests-per-second limit. 0 disables rate limiting.
    pub rate_limit: u32,
    /// Expiration for persisted request records, in seconds.
    pub record_ttl_secs: u64,
    pub redis: RedisSettings,
    pub external_api: ExternalApiSettings,
}

/// Backing-store connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: u32,
}

/// Upstream fact API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExternalApiSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Async Data Processing API".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: None,
            rate_limit: 0,
            record_ttl_secs: 24 * 60 * 60,
            redis: RedisSettings::default(),
            external_api: ExternalApiSettings::default(),
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

impl Default for ExternalApiSettings {
    fn default() -> Self {
        Self {
            url: "https://catfact.ninja/fact".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, DatapulseError> {
        let mut settings = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    DatapulseError::Config(format!("Cannot read '{}': {}", p.display(), e))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Parse settings from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, DatapulseError> {
        toml::from_str(raw).map_err(|e| DatapulseError::Config(format!("Invalid config: {e}")))
    }

    /// Apply `DATAPULSE_*` environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DATAPULSE_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("DATAPULSE_PORT")
            && let Ok(port) = v.parse()
        {
            self.port = port;
        }
        if let Ok(v) = std::env::var("DATAPULSE_REDIS_HOST") {
            self.redis.host = v;
        }
        if let Ok(v) = std::env::var("DATAPULSE_REDIS_PORT")
            && let Ok(port) = v.parse()
        {
            self.redis.port = port;
        }
        if let Ok(v) = std::env::var("DATAPULSE_REDIS_DB")
            && let Ok(db) = v.parse()
        {
            self.redis.db = db;
        }
        if let Ok(v) = std::env::var("DATAPULSE_EXTERNAL_API_URL") {
            self.external_api.url = v;
        }
        if let Ok(v) = std::env::var("DATAPULSE_EXTERNAL_API_TIMEOUT")
            && let Ok(secs) = v.parse()
        {
            self.external_api.timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("DATAPULSE_CORS_ORIGINS") {
            self.cors_origins = Some(v);
        }
        if let Ok(v) = std::env::var("DATAPULSE_RATE_LIMIT")
            && let Ok(rps) = v.parse()
        {
            self.rate_limit = rps;
        }
        if let Ok(v) = std::env::var("DATAPULSE_RECORD_TTL")
            && let Ok(secs) = v.parse()
        {
            self.record_ttl_secs = secs;
        }
    }

    /// Service version, taken from the crate manifest.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Connection URL for the backing store.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.redis.host, self.redis.port, self.redis.db)
    }

    /// Upstream request timeout as a `Duration`.
    pub fn external_api_timeout(&self) -> Duration {
        Duration::from_secs(self.external_api.timeout_secs)
    }

    /// Record expiration as a `Duration`.
    pub fn record_ttl(&self) -> Duration {
        Duration::from_secs(self.record_ttl_secs)
    }

    /// Socket address string for the HTTP server.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.redis_url(), "redis://localhost:6379/0");
        assert_eq!(settings.external_api.url, "https://catfact.ninja/fact");
        assert_eq!(settings.external_api_timeout(), Duration::from_secs(10));
        assert_eq!(settings.record_ttl(), Duration::from_secs(86_400));
        assert_eq!(settings.rate_limit, 0);
    }

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            app_name = "My Service"
            port = 9000

            [redis]
            host = "cache.internal"
            db = 2

            [external_api]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.app_name, "My Service");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.redis_url(), "redis://cache.internal:6379/2");
        assert_eq!(settings.external_api_timeout(), Duration::from_secs(3));
        // Untouched fields keep their defaults
        assert_eq!(settings.host, "0.0.0.0");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(Settings::from_toml_str("port = \"not a number\"").is_err());
    }
}
