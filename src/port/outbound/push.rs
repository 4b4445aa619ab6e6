//! Push channel ports.
//!
//! The transport side ([`PushConnector`], [`PushStream`]) moves frames; the
//! lifecycle side ([`PushHandle`], [`PushFactory`]) is what the coordinator
//! owns, one handle per live run. Handles report back only through
//! [`PushCallbacks`], never by touching coordinator state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Event, Participant, RunId};
use crate::error::Error;

/// One frame read from a push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    Text(String),
    Binary(Vec<u8>),
    /// Peer closed the connection, with its reason if any.
    Close(Option<String>),
}

/// An open push connection.
#[async_trait]
pub trait PushStream: Send {
    /// Read the next frame. `None` means the connection is gone.
    async fn next_frame(&mut self) -> Option<Result<PushFrame, Error>>;

    /// Close the connection gracefully.
    async fn close(&mut self) -> Result<(), Error>;
}

/// Opens push connections.
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushStream>, Error>;
}

/// Why a push client's retry loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The owner called `stop()`.
    Requested,
    /// The loop ended without being asked to.
    Lost,
}

/// Receiver for everything a push client reports.
///
/// Called from the client's own task; implementations must not block.
pub trait PushCallbacks: Send + Sync {
    /// Full live-run detail replaced.
    fn on_run_detail(&self, run_id: &RunId, event: Event);

    /// Participant list replaced.
    fn on_vehicle_list(&self, run_id: &RunId, participants: Vec<Participant>);

    /// The retry loop has exited. Fired exactly once per started loop.
    fn on_disconnect(&self, run_id: &RunId, reason: DisconnectReason);
}

/// Lifecycle handle for one push client.
#[async_trait]
pub trait PushHandle: Send + Sync {
    /// Launch the retry loop if it is not already running. Never blocks.
    fn start(&self);

    /// Stop the retry loop and wait for it to exit. Idempotent.
    async fn stop(&self);

    /// True only while a connection is open and being read.
    fn connected(&self) -> bool;

    fn run_id(&self) -> &RunId;
}

/// Builds push handles for newly discovered live runs.
pub trait PushFactory: Send + Sync {
    fn create(
        &self,
        run_id: RunId,
        url: String,
        callbacks: Arc<dyn PushCallbacks>,
    ) -> Arc<dyn PushHandle>;
}
