//! Configuration module for loading and parsing TOML configuration files.

use oracle_forge_client::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Header carrying the configured API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Query cache settings.
    pub cache: CacheConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// API key sent with every request, if set.
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Query cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether reads are cached.
    pub enabled: bool,
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective configuration: the file when given (defaults
    /// otherwise), then the `ORACLE_FORGE_API_URL` override, then an
    /// explicit base URL from the command line.
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or the result is invalid.
    pub fn resolve(path: Option<&Path>, base_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.override_base_url(std::env::var(BASE_URL_ENV).ok());
        config.override_base_url(base_url);
        config.validate()?;
        Ok(config)
    }

    /// Replaces the base URL with a non-blank override value.
    pub fn override_base_url(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Builds the gateway client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let default_headers = self
            .api
            .api_key
            .iter()
            .filter(|key| !key.is_empty())
            .map(|key| (API_KEY_HEADER.to_string(), key.clone()))
            .collect();

        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            default_headers,
        }
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "api.base_url must be an http(s) URL, got {base_url}"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "cache.ttl_secs must be positive when the cache is enabled".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.filter cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
