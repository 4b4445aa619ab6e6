//! Push channel fakes.
//!
//! - [`ScriptedConnector`] - Pre-loaded connection results, each with a fixed
//!   frame queue and a scripted ending. Best for: retry loop behavior.
//!
//! - [`RecordingCallbacks`] - Collects everything a push client reports and
//!   forwards it over a channel so tests can await it.
//!
//! - [`RecordingPushFactory`] - Hands out [`RecordingHandle`]s and keeps an
//!   ordered log of create/start/stop calls. Best for: coordinator lifecycle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Event, Participant, RunId};
use crate::error::{Error, Result};
use crate::port::{
    DisconnectReason, PushCallbacks, PushConnector, PushFactory, PushFrame, PushHandle, PushStream,
};

// ---------------------------------------------------------------------------
// ScriptedConnector
// ---------------------------------------------------------------------------

/// How a scripted connection ends once its frames run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Stay open and silent until closed.
    Hang,
    /// Report end of stream.
    Eof,
    /// Report a transport error.
    Error,
}

enum Attempt {
    Refuse(String),
    Accept { frames: Vec<PushFrame>, end: StreamEnd },
}

/// A connector that pops one scripted attempt per `connect()` call.
///
/// Refuses every connection once the script is exhausted.
pub struct ScriptedConnector {
    attempts: Mutex<VecDeque<Attempt>>,
    urls: Mutex<Vec<String>>,
    connect_count: Arc<AtomicU32>,
    close_count: Arc<AtomicU32>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(VecDeque::new()),
            urls: Mutex::new(Vec::new()),
            connect_count: Arc::new(AtomicU32::new(0)),
            close_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queue a refused connection.
    pub fn refuse(self, reason: &str) -> Self {
        self.attempts
            .lock()
            .unwrap()
            .push_back(Attempt::Refuse(reason.to_string()));
        self
    }

    /// Queue an accepted connection delivering `frames` as text, then `end`.
    pub fn accept_text(self, frames: &[String], end: StreamEnd) -> Self {
        let frames = frames.iter().cloned().map(PushFrame::Text).collect();
        self.accept(frames, end)
    }

    /// Queue an accepted connection delivering `frames`, then `end`.
    pub fn accept(self, frames: Vec<PushFrame>, end: StreamEnd) -> Self {
        self.attempts
            .lock()
            .unwrap()
            .push_back(Attempt::Accept { frames, end });
        self
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Number of streams closed by their owner.
    pub fn close_count(&self) -> u32 {
        self.close_count.load(Ordering::SeqCst)
    }

    /// URLs passed to `connect()`, in call order.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushConnector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushStream>> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let attempt = self.attempts.lock().unwrap().pop_front();
        match attempt {
            Some(Attempt::Accept { frames, end }) => Ok(Box::new(ScriptedPushStream {
                frames: frames.into(),
                end,
                close_count: Arc::clone(&self.close_count),
            })),
            Some(Attempt::Refuse(reason)) => Err(Error::Connection(reason)),
            None => Err(Error::Connection("script exhausted".into())),
        }
    }
}

/// Stream handed out by [`ScriptedConnector`].
pub struct ScriptedPushStream {
    frames: VecDeque<PushFrame>,
    end: StreamEnd,
    close_count: Arc<AtomicU32>,
}

#[async_trait]
impl PushStream for ScriptedPushStream {
    async fn next_frame(&mut self) -> Option<Result<PushFrame>> {
        if let Some(frame) = self.frames.pop_front() {
            return Some(Ok(frame));
        }
        match self.end {
            StreamEnd::Hang => std::future::pending().await,
            StreamEnd::Eof => None,
            StreamEnd::Error => Some(Err(Error::Connection("scripted transport error".into()))),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingCallbacks
// ---------------------------------------------------------------------------

/// One callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported {
    RunDetail(RunId, Event),
    VehicleList(RunId, Vec<Participant>),
    Disconnect(RunId, DisconnectReason),
}

/// [`PushCallbacks`] that records every call.
pub struct RecordingCallbacks {
    reported: Mutex<Vec<Reported>>,
    tx: mpsc::UnboundedSender<Reported>,
    panic_on_run_detail: bool,
}

impl RecordingCallbacks {
    /// Create the recorder plus a receiver that sees each call as it happens.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Reported>) {
        Self::build(false)
    }

    /// Like [`new`](Self::new), but panics on every `run_detail`.
    pub fn panicking() -> (Arc<Self>, mpsc::UnboundedReceiver<Reported>) {
        Self::build(true)
    }

    fn build(panic_on_run_detail: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<Reported>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callbacks = Arc::new(Self {
            reported: Mutex::new(Vec::new()),
            tx,
            panic_on_run_detail,
        });
        (callbacks, rx)
    }

    pub fn reported(&self) -> Vec<Reported> {
        self.reported.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> Vec<DisconnectReason> {
        self.reported()
            .into_iter()
            .filter_map(|r| match r {
                Reported::Disconnect(_, reason) => Some(reason),
                _ => None,
            })
            .collect()
    }

    fn record(&self, reported: Reported) {
        self.reported.lock().unwrap().push(reported.clone());
        let _ = self.tx.send(reported);
    }
}

impl PushCallbacks for RecordingCallbacks {
    fn on_run_detail(&self, run_id: &RunId, event: Event) {
        if self.panic_on_run_detail {
            panic!("scripted callback panic");
        }
        self.record(Reported::RunDetail(run_id.clone(), event));
    }

    fn on_vehicle_list(&self, run_id: &RunId, participants: Vec<Participant>) {
        self.record(Reported::VehicleList(run_id.clone(), participants));
    }

    fn on_disconnect(&self, run_id: &RunId, reason: DisconnectReason) {
        self.record(Reported::Disconnect(run_id.clone(), reason));
    }
}

// ---------------------------------------------------------------------------
// RecordingPushFactory
// ---------------------------------------------------------------------------

/// One lifecycle call observed by a [`RecordingPushFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushCall {
    Created { run_id: RunId, url: String },
    Started(RunId),
    Stopped(RunId),
}

type CallLog = Arc<Mutex<Vec<PushCall>>>;

/// A push handle that never touches the network.
///
/// Tests drive it by flipping [`set_connected`](Self::set_connected) and by
/// calling the coordinator's callbacks through [`callbacks`](Self::callbacks).
/// `stop()` reports [`DisconnectReason::Requested`] once per start, like the
/// real client.
pub struct RecordingHandle {
    run_id: RunId,
    url: String,
    callbacks: Arc<dyn PushCallbacks>,
    log: CallLog,
    running: AtomicBool,
    connected: AtomicBool,
}

impl RecordingHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The callbacks the owner registered for this handle.
    pub fn callbacks(&self) -> Arc<dyn PushCallbacks> {
        Arc::clone(&self.callbacks)
    }

    /// Simulate the retry loop dying on its own.
    pub fn lose_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if self.running.swap(false, Ordering::SeqCst) {
            self.callbacks
                .on_disconnect(&self.run_id, DisconnectReason::Lost);
        }
    }
}

#[async_trait]
impl PushHandle for RecordingHandle {
    fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            self.log
                .lock()
                .unwrap()
                .push(PushCall::Started(self.run_id.clone()));
        }
    }

    async fn stop(&self) {
        self.log
            .lock()
            .unwrap()
            .push(PushCall::Stopped(self.run_id.clone()));
        self.connected.store(false, Ordering::SeqCst);
        if self.running.swap(false, Ordering::SeqCst) {
            self.callbacks
                .on_disconnect(&self.run_id, DisconnectReason::Requested);
        }
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn run_id(&self) -> &RunId {
        &self.run_id
    }
}

/// [`PushFactory`] producing [`RecordingHandle`]s.
pub struct RecordingPushFactory {
    log: CallLog,
    handles: Mutex<Vec<Arc<RecordingHandle>>>,
    connected_on_create: bool,
}

impl RecordingPushFactory {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            handles: Mutex::new(Vec::new()),
            connected_on_create: false,
        }
    }

    /// Report every created handle as connected right away.
    pub fn connected_on_create(mut self) -> Self {
        self.connected_on_create = true;
        self
    }

    /// Ordered create/start/stop log across all handles.
    pub fn calls(&self) -> Vec<PushCall> {
        self.log.lock().unwrap().clone()
    }

    /// Every handle created so far, oldest first.
    pub fn handles(&self) -> Vec<Arc<RecordingHandle>> {
        self.handles.lock().unwrap().clone()
    }

    /// The most recently created handle.
    pub fn latest(&self) -> Option<Arc<RecordingHandle>> {
        self.handles.lock().unwrap().last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

impl Default for RecordingPushFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PushFactory for RecordingPushFactory {
    fn create(
        &self,
        run_id: RunId,
        url: String,
        callbacks: Arc<dyn PushCallbacks>,
    ) -> Arc<dyn PushHandle> {
        self.log.lock().unwrap().push(PushCall::Created {
            run_id: run_id.clone(),
            url: url.clone(),
        });
        let handle = Arc::new(RecordingHandle {
            run_id,
            url,
            callbacks,
            log: Arc::clone(&self.log),
            running: AtomicBool::new(false),
            connected: AtomicBool::new(self.connected_on_create),
        });
        self.handles.lock().unwrap().push(Arc::clone(&handle));
        handle
    }
}
