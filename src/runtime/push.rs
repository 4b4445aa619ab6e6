//! Resilient push client.
//!
//! Keeps one push connection open for one live run, retrying forever with
//! exponential backoff until told to stop. Parsed messages and the final
//! disconnect are reported through [`PushCallbacks`].
//!
//! # Retry loop
//!
//! 1. Connect to the run's endpoint.
//! 2. On success: mark connected, reset backoff, read frames until the
//!    connection errors, the peer closes, or a stop is requested.
//! 3. Otherwise: mark disconnected, sleep for the next backoff delay (the
//!    sleep ends early on stop), and go again.
//! 4. On stop: close the connection and exit without retrying.
//!
//! The disconnect callback fires exactly once when the loop exits,
//! carrying [`DisconnectReason::Requested`] for an owner-initiated stop and
//! [`DisconnectReason::Lost`] otherwise.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use super::backoff::Backoff;
use crate::domain::{PushMessage, RunId};
use crate::infrastructure::config::ReconnectionConfig;
use crate::port::{
    DisconnectReason, PushCallbacks, PushConnector, PushFactory, PushFrame, PushHandle, PushStream,
};

/// How a receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveOutcome {
    /// Stop was requested while reading.
    Stopped,
    /// Peer closed or the stream ended.
    Closed,
    /// Transport error.
    Failed,
}

/// State shared between the handle and its retry task.
struct Shared {
    run_id: RunId,
    url: String,
    connector: Arc<dyn PushConnector>,
    callbacks: Arc<dyn PushCallbacks>,
    connected: AtomicBool,
    disconnect_fired: AtomicBool,
}

impl Shared {
    /// Fire the disconnect callback unless this loop already did.
    fn fire_disconnect(&self, reason: DisconnectReason) {
        if !self.disconnect_fired.swap(true, Ordering::SeqCst) {
            info!(run_id = %self.run_id, ?reason, "Push client disconnected");
            self.callbacks.on_disconnect(&self.run_id, reason);
        }
    }

    fn dispatch(&self, text: &str) {
        match PushMessage::parse(text) {
            Ok(PushMessage::RunDetail(event)) => {
                trace!(run_id = %self.run_id, "run_detail received");
                self.callbacks.on_run_detail(&self.run_id, event);
            }
            Ok(PushMessage::VehicleList(participants)) => {
                trace!(
                    run_id = %self.run_id,
                    participants = participants.len(),
                    "vehicle_list received"
                );
                self.callbacks.on_vehicle_list(&self.run_id, participants);
            }
            Ok(PushMessage::Ignored) => {}
            Err(e) => {
                warn!(
                    run_id = %self.run_id,
                    error = %e,
                    bytes = text.len(),
                    "Failed to parse push frame"
                );
            }
        }
    }
}

/// Push client for a single run.
///
/// Cheap to query from any thread; [`start`](PushHandle::start) and
/// [`stop`](PushHandle::stop) may be called repeatedly.
pub struct PushClient {
    shared: Arc<Shared>,
    reconnection: ReconnectionConfig,
    stop_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PushClient {
    pub fn new(
        run_id: RunId,
        url: String,
        connector: Arc<dyn PushConnector>,
        callbacks: Arc<dyn PushCallbacks>,
        reconnection: ReconnectionConfig,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                run_id,
                url,
                connector,
                callbacks,
                connected: AtomicBool::new(false),
                disconnect_fired: AtomicBool::new(false),
            }),
            reconnection,
            stop_tx,
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Whether a retry loop task is currently alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl PushHandle for PushClient {
    fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        self.stop_tx.send_replace(false);
        self.shared.disconnect_fired.store(false, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let backoff = Backoff::new(&self.reconnection);
        let stop_rx = self.stop_tx.subscribe();
        debug!(run_id = %shared.run_id, url = %shared.url, "Starting push client");
        *task = Some(tokio::spawn(supervise(shared, backoff, stop_rx)));
    }

    async fn stop(&self) {
        self.stop_tx.send_replace(true);
        let task = self.task.lock().take();

        if let Some(mut task) = task {
            let timeout = self.reconnection.stop_timeout();
            if tokio::time::timeout(timeout, &mut task).await.is_err() {
                warn!(
                    run_id = %self.shared.run_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Push client did not stop in time, aborting"
                );
                task.abort();
                let _ = task.await;
                self.shared.fire_disconnect(DisconnectReason::Requested);
            }
        }

        self.shared.connected.store(false, Ordering::SeqCst);
    }

    fn connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn run_id(&self) -> &RunId {
        &self.shared.run_id
    }
}

/// Resolves once a stop has been requested (or the handle is gone).
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

/// Run the retry loop and report its exit exactly once.
///
/// A panic inside the loop (e.g. from a callback) is caught here so the
/// owner still hears about the lost channel.
async fn supervise(shared: Arc<Shared>, backoff: Backoff, stop_rx: watch::Receiver<bool>) {
    let outcome = AssertUnwindSafe(run_loop(Arc::clone(&shared), backoff, stop_rx))
        .catch_unwind()
        .await;

    shared.connected.store(false, Ordering::SeqCst);
    let reason = match outcome {
        Ok(reason) => reason,
        Err(_) => {
            error!(run_id = %shared.run_id, "Push client loop panicked");
            DisconnectReason::Lost
        }
    };
    shared.fire_disconnect(reason);
}

async fn run_loop(
    shared: Arc<Shared>,
    mut backoff: Backoff,
    mut stop_rx: watch::Receiver<bool>,
) -> DisconnectReason {
    loop {
        if *stop_rx.borrow() {
            return DisconnectReason::Requested;
        }

        let attempt = tokio::select! {
            biased;
            () = stop_requested(&mut stop_rx) => return DisconnectReason::Requested,
            result = shared.connector.connect(&shared.url) => result,
        };

        match attempt {
            Ok(mut stream) => {
                shared.connected.store(true, Ordering::SeqCst);
                backoff.reset();
                info!(run_id = %shared.run_id, "Push client connected");

                let outcome = receive(&shared, stream.as_mut(), &mut stop_rx).await;
                shared.connected.store(false, Ordering::SeqCst);

                if outcome == ReceiveOutcome::Stopped {
                    if let Err(e) = stream.close().await {
                        debug!(run_id = %shared.run_id, error = %e, "Error closing push connection");
                    }
                    return DisconnectReason::Requested;
                }
            }
            Err(e) => {
                warn!(run_id = %shared.run_id, error = %e, "Push connection failed");
            }
        }

        let delay = backoff.next_delay();
        debug!(
            run_id = %shared.run_id,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting push client after delay"
        );
        tokio::select! {
            biased;
            () = stop_requested(&mut stop_rx) => return DisconnectReason::Requested,
            () = sleep(delay) => {}
        }
    }
}

async fn receive(
    shared: &Shared,
    stream: &mut dyn PushStream,
    stop_rx: &mut watch::Receiver<bool>,
) -> ReceiveOutcome {
    loop {
        let frame = tokio::select! {
            biased;
            () = stop_requested(stop_rx) => return ReceiveOutcome::Stopped,
            frame = stream.next_frame() => frame,
        };

        match frame {
            Some(Ok(PushFrame::Text(text))) => shared.dispatch(&text),
            Some(Ok(PushFrame::Binary(data))) => {
                trace!(run_id = %shared.run_id, bytes = data.len(), "Ignoring binary frame");
            }
            Some(Ok(PushFrame::Close(reason))) => {
                info!(run_id = %shared.run_id, reason = ?reason, "Push connection closed by server");
                return ReceiveOutcome::Closed;
            }
            Some(Err(e)) => {
                warn!(run_id = %shared.run_id, error = %e, "Push connection error");
                return ReceiveOutcome::Failed;
            }
            None => {
                info!(run_id = %shared.run_id, "Push stream ended");
                return ReceiveOutcome::Closed;
            }
        }
    }
}

/// Builds [`PushClient`]s over a shared connector.
pub struct PushClientFactory {
    connector: Arc<dyn PushConnector>,
    reconnection: ReconnectionConfig,
}

impl PushClientFactory {
    pub fn new(connector: Arc<dyn PushConnector>, reconnection: ReconnectionConfig) -> Self {
        Self {
            connector,
            reconnection,
        }
    }
}

impl PushFactory for PushClientFactory {
    fn create(
        &self,
        run_id: RunId,
        url: String,
        callbacks: Arc<dyn PushCallbacks>,
    ) -> Arc<dyn PushHandle> {
        Arc::new(PushClient::new(
            run_id,
            url,
            Arc::clone(&self.connector),
            callbacks,
            self.reconnection.clone(),
        ))
    }
}

#[cfg(test)]
mod tests;
