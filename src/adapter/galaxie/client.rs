//! Galaxie REST API client.
//!
//! All resources are plain `GET`s returning JSON. Any non-2xx status is an
//! [`Error::Status`]; a body of the wrong shape is an [`Error::Json`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::endpoints;
use crate::domain::{BackendConfig, Event, RunId, Weather};
use crate::error::{Error, Result};
use crate::infrastructure::config::ApiConfig;
use crate::port::RaceApi;

/// HTTP client for the Galaxie backend.
pub struct GalaxieClient {
    http: HttpClient,
    base_url: String,
}

impl GalaxieClient {
    /// Create a client with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: normalize(base_url.into()),
        }
    }

    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: normalize(config.base_url.clone()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "Fetching");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[async_trait]
impl RaceApi for GalaxieClient {
    async fn previous_events(&self) -> Result<Vec<Event>> {
        self.get(endpoints::PREVIOUS_RACE).await
    }

    async fn next_events(&self) -> Result<Vec<Event>> {
        self.get(endpoints::NEXT_RACE).await
    }

    async fn live_events(&self) -> Result<Vec<Event>> {
        self.get(endpoints::LIVE).await
    }

    async fn backend_config(&self) -> Result<BackendConfig> {
        let config: BackendConfig = self.get(endpoints::CONFIG).await?;
        debug!(
            version = config.version.as_deref().unwrap_or("unknown"),
            environment = config.environment().unwrap_or("unknown"),
            "Backend config received"
        );
        Ok(config)
    }

    async fn weather(&self, run_id: &RunId) -> Result<Weather> {
        self.get(&endpoints::weather(run_id)).await
    }
}
