//! Backend resource paths.

use crate::domain::RunId;

pub const PREVIOUS_RACE: &str = "/api/previous_race/";
pub const NEXT_RACE: &str = "/api/next_race/";
pub const LIVE: &str = "/api/live/";
pub const CONFIG: &str = "/api/config/";

/// Weather path for one run.
#[must_use]
pub fn weather(run_id: &RunId) -> String {
    format!("/api/runs/{run_id}/weather/")
}

/// Push endpoint for one run, e.g. `wss://galaxie.app/ws/runs/abc-123/`.
#[must_use]
pub fn push_url(ws_base: &str, run_id: &RunId) -> String {
    format!("{}/ws/runs/{run_id}/", ws_base.trim_end_matches('/'))
}
