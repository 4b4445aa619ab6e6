//! Refresh cadence and cache lifetimes.

use std::time::Duration;

use serde::Deserialize;

/// How often the coordinator ticks and how long cached resources live.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between refresh ticks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Seconds a fetched backend config stays fresh.
    #[serde(default = "default_config_ttl_secs")]
    pub config_ttl_secs: u64,
    /// Seconds fetched weather stays fresh while a race is live.
    #[serde(default = "default_weather_ttl_secs")]
    pub weather_ttl_secs: u64,
}

const fn default_interval_secs() -> u64 {
    15
}

const fn default_config_ttl_secs() -> u64 {
    3600
}

const fn default_weather_ttl_secs() -> u64 {
    600
}

impl RefreshConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn config_ttl(&self) -> Duration {
        Duration::from_secs(self.config_ttl_secs)
    }

    #[must_use]
    pub const fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            config_ttl_secs: default_config_ttl_secs(),
            weather_ttl_secs: default_weather_ttl_secs(),
        }
    }
}
