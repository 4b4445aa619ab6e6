//! Builders for domain records used across tests.
//!
//! Records are raw JSON objects on the wire, so these keep tests focused on
//! the handful of fields each one cares about.

use serde_json::{json, Map, Value};

use crate::domain::{BackendConfig, Event, Participant, RunId, Weather};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Create a [`RunId`] from a string.
pub fn run_id(id: &str) -> RunId {
    RunId::from(id)
}

/// An event with an identifier and a name.
pub fn event(id: &str, name: &str) -> Event {
    Event::new(object(json!({ "id": id, "name": name })))
}

/// An event carrying a series name, as returned by the schedule endpoints.
pub fn series_event(id: &str, series: &str) -> Event {
    Event::new(object(json!({ "id": id, "series_name": series })))
}

/// A live event at the given lap.
pub fn live_event(id: &str, lap: i64) -> Event {
    Event::new(object(json!({ "id": id, "name": format!("Run {id}"), "lap_number": lap })))
}

/// A live event without an identifier.
pub fn anonymous_event(name: &str) -> Event {
    Event::new(object(json!({ "name": name })))
}

pub fn participant(position: u64, driver: &str) -> Participant {
    Participant::new(object(json!({
        "running_position": position,
        "display_name": driver,
    })))
}

pub fn weather(temperature: f64) -> Weather {
    Weather::new(object(json!({
        "current": { "temp": temperature, "humidity": 40 },
        "hourly": [{ "pop": 0.25 }],
    })))
}

pub fn backend_config(version: &str) -> BackendConfig {
    serde_json::from_value(json!({ "version": version, "environment": "test" }))
        .expect("backend config fixture")
}

/// Text of a `run_detail` push frame for `id` at `lap`.
pub fn run_detail_frame(id: &str, lap: i64) -> String {
    json!({ "type": "run_detail", "data": { "id": id, "lap_number": lap } }).to_string()
}

/// Text of a `vehicle_list` push frame with one participant per driver.
pub fn vehicle_list_frame(drivers: &[&str]) -> String {
    let data: Vec<Value> = drivers
        .iter()
        .enumerate()
        .map(|(i, driver)| json!({ "running_position": i + 1, "display_name": driver }))
        .collect();
    json!({ "type": "vehicle_list", "data": data }).to_string()
}
