//! Backend endpoint configuration.

use serde::Deserialize;

/// Where the backend lives and how patient to be with it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// WebSocket base URL; per-run endpoints are derived from it.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://galaxie.app".into()
}

fn default_ws_url() -> String {
    "wss://galaxie.app".into()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
