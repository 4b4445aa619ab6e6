//! REST port for the backend's race resources.

use async_trait::async_trait;

use crate::domain::{BackendConfig, Event, RunId, Weather};
use crate::error::Error;

/// Read-only access to the backend's REST resources.
///
/// Implementations report every failure (transport, status, body shape) as
/// an error; degrading to empty values is the caller's decision.
#[async_trait]
pub trait RaceApi: Send + Sync {
    /// Most recent completed race per series.
    async fn previous_events(&self) -> Result<Vec<Event>, Error>;

    /// Next scheduled race per series.
    async fn next_events(&self) -> Result<Vec<Event>, Error>;

    /// Races currently in progress.
    async fn live_events(&self) -> Result<Vec<Event>, Error>;

    /// Backend configuration document.
    async fn backend_config(&self) -> Result<BackendConfig, Error>;

    /// Track weather for a live run.
    async fn weather(&self, run_id: &RunId) -> Result<Weather, Error>;
}
