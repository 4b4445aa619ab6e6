//! Scripted [`RaceApi`] for coordinator tests.
//!
//! Each resource holds a fixed response that tests can swap between ticks.
//! A `None` response fails the call with a 500 status. Call counters let
//! tests assert which endpoints a tick actually touched.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{BackendConfig, Event, RunId, Weather};
use crate::error::{Error, Result};
use crate::port::RaceApi;

#[derive(Default)]
struct Responses {
    previous: Option<Vec<Event>>,
    next: Option<Vec<Event>>,
    live: Option<Vec<Event>>,
    config: Option<BackendConfig>,
    weather: Option<Weather>,
}

/// Counts of calls made against a [`ScriptedApi`].
#[derive(Default)]
pub struct CallCounts {
    pub previous: AtomicU32,
    pub next: AtomicU32,
    pub live: AtomicU32,
    pub config: AtomicU32,
    pub weather: AtomicU32,
}

/// A [`RaceApi`] returning canned responses.
///
/// Starts with empty lists everywhere and failing config/weather.
pub struct ScriptedApi {
    responses: Mutex<Responses>,
    calls: CallCounts,
    weather_runs: Mutex<Vec<RunId>>,
    delay: Duration,
    panic_on_live: AtomicBool,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Responses {
                previous: Some(Vec::new()),
                next: Some(Vec::new()),
                live: Some(Vec::new()),
                config: None,
                weather: None,
            }),
            calls: CallCounts::default(),
            weather_runs: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            panic_on_live: AtomicBool::new(false),
        }
    }

    /// Delay every call by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Panic inside the live fetch, simulating a bug escaping the tick.
    pub fn with_panicking_live(self) -> Self {
        self.set_panicking_live(true);
        self
    }

    pub fn set_panicking_live(&self, panicking: bool) {
        self.panic_on_live.store(panicking, Ordering::SeqCst);
    }

    pub fn set_previous(&self, events: Option<Vec<Event>>) {
        self.responses.lock().unwrap().previous = events;
    }

    pub fn set_next(&self, events: Option<Vec<Event>>) {
        self.responses.lock().unwrap().next = events;
    }

    pub fn set_live(&self, events: Option<Vec<Event>>) {
        self.responses.lock().unwrap().live = events;
    }

    pub fn set_config(&self, config: Option<BackendConfig>) {
        self.responses.lock().unwrap().config = config;
    }

    pub fn set_weather(&self, weather: Option<Weather>) {
        self.responses.lock().unwrap().weather = weather;
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    pub fn previous_calls(&self) -> u32 {
        self.calls.previous.load(Ordering::SeqCst)
    }

    pub fn next_calls(&self) -> u32 {
        self.calls.next.load(Ordering::SeqCst)
    }

    pub fn live_calls(&self) -> u32 {
        self.calls.live.load(Ordering::SeqCst)
    }

    pub fn config_calls(&self) -> u32 {
        self.calls.config.load(Ordering::SeqCst)
    }

    pub fn weather_calls(&self) -> u32 {
        self.calls.weather.load(Ordering::SeqCst)
    }

    /// Run ids weather was requested for, in call order.
    pub fn weather_runs(&self) -> Vec<RunId> {
        self.weather_runs.lock().unwrap().clone()
    }

    async fn respond<T>(
        &self,
        counter: &AtomicU32,
        path: &str,
        pick: impl FnOnce(&Responses) -> Option<T>,
    ) -> Result<T> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let response = pick(&self.responses.lock().unwrap());
        response.ok_or_else(|| Error::Status {
            url: format!("scripted://{path}"),
            status: 500,
        })
    }
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RaceApi for ScriptedApi {
    async fn previous_events(&self) -> Result<Vec<Event>> {
        self.respond(&self.calls.previous, "previous_race", |r| r.previous.clone())
            .await
    }

    async fn next_events(&self) -> Result<Vec<Event>> {
        self.respond(&self.calls.next, "next_race", |r| r.next.clone())
            .await
    }

    async fn live_events(&self) -> Result<Vec<Event>> {
        if self.panic_on_live.load(Ordering::SeqCst) {
            self.calls.live.fetch_add(1, Ordering::SeqCst);
            panic!("scripted live fetch panic");
        }
        self.respond(&self.calls.live, "live", |r| r.live.clone())
            .await
    }

    async fn backend_config(&self) -> Result<BackendConfig> {
        self.respond(&self.calls.config, "config", |r| r.config.clone())
            .await
    }

    async fn weather(&self, run_id: &RunId) -> Result<Weather> {
        self.weather_runs.lock().unwrap().push(run_id.clone());
        self.respond(&self.calls.weather, "weather", |r| r.weather.clone())
            .await
    }
}
