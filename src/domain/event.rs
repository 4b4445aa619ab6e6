//! Backend records: race events, participants, weather and backend config.
//!
//! The backend schema is wide and changes often, so records keep the raw
//! JSON object and expose typed accessors for the fields consumers read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::RunId;

/// Flag code reported by the backend for a yellow (caution) period.
const CAUTION_FLAG: i64 = 2;

/// Human-readable label for a flag code.
#[must_use]
pub fn flag_label(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Green"),
        2 => Some("Yellow"),
        3 => Some("Red"),
        4 => Some("Checkered"),
        8 => Some("Pre Race"),
        9 => Some("Checkered Flag"),
        _ => None,
    }
}

/// Human-readable label for a series code.
#[must_use]
pub fn series_label(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("NASCAR Cup Series"),
        2 => Some("NASCAR Xfinity Series"),
        3 => Some("NASCAR Craftsman Truck Series"),
        _ => None,
    }
}

fn label_or_unknown(value: &Value, lookup: fn(i64) -> Option<&'static str>) -> String {
    value
        .as_i64()
        .and_then(lookup)
        .map_or_else(|| format!("Unknown ({value})"), str::to_string)
}

/// One scheduled or live race session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Run identifier. Numeric ids are accepted and rendered as strings.
    #[must_use]
    pub fn id(&self) -> Option<RunId> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(RunId::new(s.clone())),
            Value::Number(n) => Some(RunId::new(n.to_string())),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Series name as published on previous/next race records.
    #[must_use]
    pub fn series_name(&self) -> Option<&str> {
        self.0.get("series_name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn lap_number(&self) -> Option<i64> {
        self.0.get("lap_number").and_then(Value::as_i64)
    }

    /// Label for the current flag, `Unknown (<code>)` for unmapped codes.
    #[must_use]
    pub fn flag_name(&self) -> Option<String> {
        self.0.get("flag").map(|v| label_or_unknown(v, flag_label))
    }

    /// Label for the numeric series code on live records.
    #[must_use]
    pub fn series_label(&self) -> Option<String> {
        self.0.get("series").map(|v| label_or_unknown(v, series_label))
    }

    /// Number of caution periods recorded so far.
    #[must_use]
    pub fn caution_count(&self) -> usize {
        self.0
            .get("flag_periods")
            .and_then(Value::as_array)
            .map_or(0, |periods| {
                periods
                    .iter()
                    .filter(|p| p.get("flag").and_then(Value::as_i64) == Some(CAUTION_FLAG))
                    .count()
            })
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One competitor entry in the live race.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(Map<String, Value>);

impl Participant {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn running_position(&self) -> Option<u64> {
        self.0.get("running_position").and_then(Value::as_u64)
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.0.get("display_name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn team_name(&self) -> Option<&str> {
        self.0.get("team_name").and_then(Value::as_str)
    }
}

/// Track weather for the live run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weather(Map<String, Value>);

impl Weather {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    fn current(&self, field: &str) -> Option<&Value> {
        self.0.get("current")?.get(field)
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.current("temp").and_then(Value::as_f64)
    }

    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        self.current("humidity").and_then(Value::as_f64)
    }

    #[must_use]
    pub fn wind_speed(&self) -> Option<f64> {
        self.current("wind_speed").and_then(Value::as_f64)
    }

    #[must_use]
    pub fn wind_direction(&self) -> Option<f64> {
        self.current("wind_deg").and_then(Value::as_f64)
    }

    /// Chance of rain in the next hour, in percent.
    ///
    /// A missing `pop` on the first hourly entry counts as zero; an empty
    /// hourly forecast yields `None`.
    #[must_use]
    pub fn rain_chance(&self) -> Option<i64> {
        let first = self.0.get("hourly")?.as_array()?.first()?;
        match first.get("pop") {
            None => Some(0),
            Some(pop) => pop.as_f64().map(|p| (p * 100.0).round() as i64),
        }
    }

    /// Short conditions summary, e.g. "Clouds".
    #[must_use]
    pub fn conditions(&self) -> Option<&str> {
        self.current("weather")?
            .as_array()?
            .first()?
            .get("main")?
            .as_str()
    }
}

/// Backend configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BackendConfig {
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.fields.get("environment").and_then(Value::as_str)
    }

    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.fields.get("timezone").and_then(Value::as_str)
    }

    #[must_use]
    pub fn websockets_enabled(&self) -> Option<bool> {
        self.fields.get("websockets_enabled").and_then(Value::as_bool)
    }
}
