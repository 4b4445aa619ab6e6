//! Push channel message envelope.
//!
//! Frames arrive as `{"type": "...", "data": ...}`. Only the two slow-moving
//! aggregates are decoded; the telemetry types (lap times, pit stops, ...)
//! are dropped.
//!
//! Example:
//! ```json
//! {"type": "run_detail", "data": {"id": "abc-123", "lap_number": 42}}
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::event::{Event, Participant};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Value,
}

/// A decoded push frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    /// Full live-run detail.
    RunDetail(Event),
    /// Full participant list.
    VehicleList(Vec<Participant>),
    /// Any other type, or a recognized type without a payload.
    Ignored,
}

impl PushMessage {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a JSON object, or if a
    /// recognized type carries a payload of the wrong shape.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(text)?;
        if envelope.data.is_null() {
            return Ok(Self::Ignored);
        }

        match envelope.kind.as_deref() {
            Some("run_detail") => Ok(Self::RunDetail(serde_json::from_value(envelope.data)?)),
            Some("vehicle_list") => Ok(Self::VehicleList(serde_json::from_value(envelope.data)?)),
            _ => Ok(Self::Ignored),
        }
    }
}
