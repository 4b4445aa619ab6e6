//! Transport-agnostic domain types.

pub mod cache;
pub mod event;
pub mod id;
pub mod message;
pub mod snapshot;

pub use cache::CachedResource;
pub use event::{flag_label, series_label, BackendConfig, Event, Participant, Weather};
pub use id::RunId;
pub use message::PushMessage;
pub use snapshot::{Snapshot, UNKNOWN_VERSION};
