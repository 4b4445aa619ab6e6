//! Data acquisition coordinator.
//!
//! Combines periodic REST polling with a push channel for the live run and
//! publishes one merged [`Snapshot`] per tick, plus one per push update in
//! between ticks.
//!
//! # Tick
//!
//! 1. Decide whether backend config is due (TTL cache).
//! 2. Skip the live REST fetch while the push client is connected.
//! 3. Fetch previous/next/live/config concurrently; each failure degrades
//!    on its own.
//! 4. Resolve the live event from push data or REST, and assemble.
//! 5. Start, switch or stop the push client to follow the live run.
//! 6. Refresh weather for the live run when due, then publish.
//!
//! A panic anywhere in the tick surfaces as [`Error::UpdateFailed`] and
//! the last good snapshot stays current.

mod fetch;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::publisher::SnapshotPublisher;
use crate::adapter::galaxie::push_url;
use crate::domain::{
    BackendConfig, CachedResource, Event, Participant, RunId, Snapshot, Weather, UNKNOWN_VERSION,
};
use crate::error::{Error, Result};
use crate::infrastructure::config::RefreshConfig;
use crate::port::{DisconnectReason, PushCallbacks, PushFactory, PushHandle, RaceApi};

/// Cross-tick state. Guarded by a sync mutex that is never held across
/// an await point.
struct State {
    tracked_run: Option<RunId>,
    client: Option<Arc<dyn PushHandle>>,
    live_push: Option<Event>,
    participants_push: Option<Vec<Participant>>,
    /// Bumped on every push data update.
    push_generation: u64,
    /// Most recently staged snapshot and its publish sequence.
    latest: Option<Arc<Snapshot>>,
    sequence: u64,
    config: CachedResource<BackendConfig>,
    weather: CachedResource<Weather>,
}

impl State {
    fn push_active(&self) -> bool {
        self.client.as_ref().is_some_and(|client| client.connected())
    }

    fn forget_push(&mut self) {
        self.tracked_run = None;
        self.live_push = None;
        self.participants_push = None;
    }

    fn tracks(&self, run_id: &RunId) -> bool {
        self.tracked_run.as_ref() == Some(run_id)
    }

    /// Number `snapshot` for publication and make it the base for push
    /// updates. Publish the result only after releasing the lock.
    fn stage(&mut self, snapshot: Snapshot) -> (u64, Arc<Snapshot>) {
        self.sequence += 1;
        let snapshot = Arc::new(snapshot);
        self.latest = Some(Arc::clone(&snapshot));
        (self.sequence, snapshot)
    }
}

struct Inner {
    api: Arc<dyn RaceApi>,
    push: Arc<dyn PushFactory>,
    ws_base: String,
    publisher: Arc<SnapshotPublisher>,
    state: Mutex<State>,
    /// Serializes push client start/stop so a replacement never overlaps
    /// the client it replaces.
    lifecycle: tokio::sync::Mutex<()>,
}

/// Owner of the snapshot, the caches and the push client.
///
/// Cloning is cheap and every clone drives the same state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(
        api: Arc<dyn RaceApi>,
        push: Arc<dyn PushFactory>,
        ws_base: impl Into<String>,
        refresh: &RefreshConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                push,
                ws_base: ws_base.into(),
                publisher: Arc::new(SnapshotPublisher::new()),
                state: Mutex::new(State {
                    tracked_run: None,
                    client: None,
                    live_push: None,
                    participants_push: None,
                    push_generation: 0,
                    latest: None,
                    sequence: 0,
                    config: CachedResource::new(refresh.config_ttl()),
                    weather: CachedResource::new(refresh.weather_ttl()),
                }),
                lifecycle: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Run one tick and publish the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpdateFailed`] if the tick could not complete. The
    /// previously published snapshot is kept.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        match AssertUnwindSafe(self.inner.tick()).catch_unwind().await {
            Ok(snapshot) => Ok(snapshot),
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(error = %reason, "Refresh failed");
                self.inner.publisher.mark_failed();
                Err(Error::UpdateFailed(reason))
            }
        }
    }

    /// Stop any push client and drop live-only state.
    pub async fn shutdown(&self) {
        let _gate = self.inner.lifecycle.lock().await;
        let client = {
            let mut state = self.inner.state.lock();
            state.forget_push();
            state.weather.clear();
            state.client.take()
        };
        if let Some(client) = client {
            info!(run_id = %client.run_id(), "Stopping push client for shutdown");
            client.stop().await;
        }
        info!("Coordinator shut down");
    }

    #[must_use]
    pub fn publisher(&self) -> &Arc<SnapshotPublisher> {
        &self.inner.publisher
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.inner.publisher.current()
    }

    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.inner.publisher.last_update_success()
    }

    /// Run the push client is following, if any.
    #[must_use]
    pub fn tracked_run_id(&self) -> Option<RunId> {
        self.inner.state.lock().tracked_run.clone()
    }

    #[must_use]
    pub fn push_connected(&self) -> bool {
        self.inner.state.lock().push_active()
    }

    /// Version from the cached backend config, or `"unknown"`.
    #[must_use]
    pub fn backend_version(&self) -> String {
        self.inner
            .state
            .lock()
            .config
            .value()
            .and_then(|config| config.version.clone())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// Age the cached backend config as if it had been fetched `by` earlier.
    #[cfg(any(test, feature = "testkit"))]
    pub fn backdate_config(&self, by: std::time::Duration) {
        self.inner.state.lock().config.backdate(by);
    }

    /// Age the cached weather as if it had been fetched `by` earlier.
    #[cfg(any(test, feature = "testkit"))]
    pub fn backdate_weather(&self, by: std::time::Duration) {
        self.inner.state.lock().weather.backdate(by);
    }
}

impl Inner {
    async fn tick(self: &Arc<Self>) -> Arc<Snapshot> {
        let started = Instant::now();
        let (push_active, config_due) = {
            let state = self.state.lock();
            (state.push_active(), state.config.should_refresh(started))
        };
        if push_active {
            debug!("Push channel connected, skipping live fetch");
        }

        let (previous_event, next_event, polled_live, fetched_config) = tokio::join!(
            fetch::list("previous_race", self.api.previous_events()),
            fetch::list("next_race", self.api.next_events()),
            async {
                if push_active {
                    None
                } else {
                    Some(fetch::list("live", self.api.live_events()).await)
                }
            },
            async {
                if config_due {
                    fetch::object("config", self.api.backend_config()).await
                } else {
                    None
                }
            },
        );

        let (mut snapshot, generation) = {
            let mut state = self.state.lock();
            if let Some(config) = fetched_config {
                state.config.store(config, started);
            }
            let live_event = match polled_live {
                Some(events) => events,
                None => state.live_push.clone().into_iter().collect(),
            };
            let snapshot = Snapshot {
                previous_event,
                next_event,
                live_event,
                participant_list: state.participants_push.clone().unwrap_or_default(),
                weather: state.weather.cloned(),
                config: state.config.cloned(),
            };
            (snapshot, state.push_generation)
        };

        self.follow_live_run(&snapshot.live_event).await;

        let weather_run = {
            let state = self.state.lock();
            let tracked_live = snapshot
                .current_live()
                .and_then(Event::id)
                .filter(|run_id| state.tracks(run_id));
            if state.weather.should_refresh(Instant::now()) {
                tracked_live
            } else {
                None
            }
        };
        if let Some(run_id) = weather_run {
            if let Some(weather) = fetch::object("weather", self.api.weather(&run_id)).await {
                self.state.lock().weather.store(weather.clone(), Instant::now());
                snapshot.weather = Some(weather);
            }
        }

        let (sequence, snapshot) = {
            let mut state = self.state.lock();
            if state.push_generation != generation {
                // Push data arrived mid-tick; publish the newer values.
                let follows_live = snapshot
                    .current_live()
                    .and_then(Event::id)
                    .is_some_and(|run_id| state.tracks(&run_id));
                if let Some(event) = state.live_push.as_ref().filter(|_| follows_live) {
                    snapshot.live_event = vec![event.clone()];
                }
                if let Some(participants) = &state.participants_push {
                    snapshot.participant_list = participants.clone();
                }
            }
            state.stage(snapshot)
        };
        debug!(
            sequence,
            live = snapshot.is_live(),
            previous = snapshot.previous_event.len(),
            next = snapshot.next_event.len(),
            participants = snapshot.participant_list.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh complete"
        );
        self.publisher.publish_sequenced(sequence, Arc::clone(&snapshot));
        snapshot
    }

    /// Make the push client follow the first live event.
    async fn follow_live_run(self: &Arc<Self>, live_event: &[Event]) {
        let _gate = self.lifecycle.lock().await;

        let Some(first) = live_event.first() else {
            let client = {
                let mut state = self.state.lock();
                state.forget_push();
                state.weather.clear();
                state.client.take()
            };
            if let Some(client) = client {
                info!(run_id = %client.run_id(), "Live run ended, stopping push client");
                client.stop().await;
            }
            return;
        };

        let Some(run_id) = first.id() else {
            debug!("Live event has no identifier, leaving push client as is");
            return;
        };

        let previous = {
            let mut state = self.state.lock();
            if state.tracks(&run_id) {
                return;
            }
            state.forget_push();
            state.client.take()
        };
        if let Some(previous) = previous {
            info!(
                from = %previous.run_id(),
                to = %run_id,
                "Live run changed, replacing push client"
            );
            previous.stop().await;
        }

        let url = push_url(&self.ws_base, &run_id);
        let callbacks: Arc<dyn PushCallbacks> = Arc::new(CoordinatorCallbacks {
            inner: Arc::downgrade(self),
        });
        let client = self.push.create(run_id.clone(), url.clone(), callbacks);
        {
            let mut state = self.state.lock();
            state.tracked_run = Some(run_id.clone());
            state.client = Some(Arc::clone(&client));
        }
        info!(run_id = %run_id, url = %url, "Starting push client");
        client.start();
    }
}

/// Push callbacks routed back into the coordinator.
///
/// Holds a weak reference so a push client never keeps a dropped
/// coordinator alive.
struct CoordinatorCallbacks {
    inner: Weak<Inner>,
}

impl CoordinatorCallbacks {
    fn update<F>(&self, run_id: &RunId, kind: &'static str, apply: F)
    where
        F: FnOnce(&mut State, &Snapshot) -> Snapshot,
    {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let staged = {
            let mut state = inner.state.lock();
            if !state.tracks(run_id) {
                debug!(run_id = %run_id, kind, "Ignoring push update for untracked run");
                return;
            }
            state.push_generation += 1;
            let latest = state.latest.clone();
            let base = latest.as_deref().cloned().unwrap_or_default();
            let updated = apply(&mut *state, &base);
            // Nothing to patch before the first tick; the tick picks it up.
            latest.map(|_| state.stage(updated))
        };
        if let Some((sequence, snapshot)) = staged {
            inner.publisher.publish_sequenced(sequence, snapshot);
        }
    }
}

impl PushCallbacks for CoordinatorCallbacks {
    fn on_run_detail(&self, run_id: &RunId, event: Event) {
        self.update(run_id, "run_detail", |state, snapshot| {
            state.live_push = Some(event.clone());
            snapshot.with_live_event(event)
        });
    }

    fn on_vehicle_list(&self, run_id: &RunId, participants: Vec<Participant>) {
        self.update(run_id, "vehicle_list", |state, snapshot| {
            state.participants_push = Some(participants.clone());
            snapshot.with_participants(participants)
        });
    }

    fn on_disconnect(&self, run_id: &RunId, reason: DisconnectReason) {
        if reason == DisconnectReason::Requested {
            return;
        }
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.state.lock();
        if state.tracks(run_id) {
            info!(run_id = %run_id, "Push channel lost, falling back to polling");
            state.forget_push();
            state.client = None;
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "refresh panicked".to_string()
    }
}
