//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section is optional and
//! falls back to the public Galaxie backend. `GALAXIE_API_URL` and
//! `GALAXIE_WS_URL` override the endpoints.
//!
//! # Example
//!
//! ```no_run
//! use galaxie::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::api::ApiConfig;
use super::logging::LoggingConfig;
use super::reconnection::ReconnectionConfig;
use super::refresh::RefreshConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_ENV: &str = "GALAXIE_API_URL";
/// Environment variable overriding [`ApiConfig::ws_url`].
pub const WS_URL_ENV: &str = "GALAXIE_WS_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply endpoint overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(url) = lookup(WS_URL_ENV).filter(|u| !u.is_empty()) {
            self.api.ws_url = url;
        }
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        if self.api.ws_url.is_empty() {
            return Err(ConfigError::MissingField { field: "ws_url" }.into());
        }
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: e.to_string(),
            }
            .into());
        }
        match url::Url::parse(&self.api.ws_url) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "ws_url",
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                }
                .into());
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    field: "ws_url",
                    reason: e.to_string(),
                }
                .into());
            }
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be at least 1.0".to_string(),
            }
            .into());
        }
        if self.reconnection.initial_delay_ms > self.reconnection.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must not exceed max_delay_ms".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
