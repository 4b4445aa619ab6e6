//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::galaxie::{GalaxieClient, TungsteniteConnector};
use crate::infrastructure::config::Config;
use crate::port::{PushConnector, PushFactory, RaceApi};
use crate::runtime::{Coordinator, PushClientFactory};

/// Build the REST client from configuration.
#[must_use]
pub fn build_api(config: &Config) -> Arc<dyn RaceApi> {
    Arc::new(GalaxieClient::from_config(&config.api))
}

/// Build the push client factory over a WebSocket connector.
#[must_use]
pub fn build_push_factory(config: &Config) -> Arc<dyn PushFactory> {
    let connector: Arc<dyn PushConnector> =
        Arc::new(TungsteniteConnector::from_config(&config.api));
    Arc::new(PushClientFactory::new(
        connector,
        config.reconnection.clone(),
    ))
}

/// Wire a coordinator against the configured backend.
#[must_use]
pub fn build_coordinator(config: &Config) -> Coordinator {
    info!(
        api = %config.api.base_url,
        ws = %config.api.ws_url,
        "Wiring coordinator"
    );
    Coordinator::new(
        build_api(config),
        build_push_factory(config),
        config.api.ws_url.clone(),
        &config.refresh,
    )
}
