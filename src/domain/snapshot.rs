//! The unified, point-in-time view of everything the feed tracks.

use serde::Serialize;

use super::event::{BackendConfig, Event, Participant, Weather};

/// Version string reported when no backend config has been fetched yet.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Aggregate of all tracked resources, published wholesale to consumers.
///
/// List fields are always present (possibly empty) so consumers can check
/// any of them unconditionally. A published snapshot is never mutated; push
/// updates produce a new value via [`Snapshot::with_live_event`] and
/// [`Snapshot::with_participants`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub previous_event: Vec<Event>,
    pub next_event: Vec<Event>,
    /// Zero or one element in practice.
    pub live_event: Vec<Event>,
    pub participant_list: Vec<Participant>,
    pub weather: Option<Weather>,
    pub config: Option<BackendConfig>,
}

impl Snapshot {
    /// Whether a live race is in progress.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.live_event.is_empty()
    }

    /// The live race, if any.
    #[must_use]
    pub fn current_live(&self) -> Option<&Event> {
        self.live_event.first()
    }

    #[must_use]
    pub fn backend_version(&self) -> &str {
        self.config
            .as_ref()
            .and_then(|c| c.version.as_deref())
            .unwrap_or(UNKNOWN_VERSION)
    }

    /// Most recent completed race for a series, matched on `series_name`.
    #[must_use]
    pub fn previous_for_series(&self, series: &str) -> Option<&Event> {
        self.previous_event
            .iter()
            .find(|e| e.series_name() == Some(series))
    }

    /// Next scheduled race for a series, matched on `series_name`.
    #[must_use]
    pub fn next_for_series(&self, series: &str) -> Option<&Event> {
        self.next_event.iter().find(|e| e.series_name() == Some(series))
    }

    /// Participant currently running at `position` (1-based).
    #[must_use]
    pub fn participant_at(&self, position: u64) -> Option<&Participant> {
        self.participant_list
            .iter()
            .find(|p| p.running_position() == Some(position))
    }

    /// Copy of this snapshot with the live event replaced.
    #[must_use]
    pub fn with_live_event(&self, event: Event) -> Self {
        Self {
            live_event: vec![event],
            ..self.clone()
        }
    }

    /// Copy of this snapshot with the participant list replaced.
    #[must_use]
    pub fn with_participants(&self, participants: Vec<Participant>) -> Self {
        Self {
            participant_list: participants,
            ..self.clone()
        }
    }
}
