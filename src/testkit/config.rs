//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::infrastructure::config::{ReconnectionConfig, RefreshConfig};

/// Reconnection config with zero delays.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        stop_timeout_ms: 1_000,
    }
}

/// Default refresh cadence and cache lifetimes.
pub fn refresh() -> RefreshConfig {
    RefreshConfig::default()
}
