//! Acquisition runtime: push client, coordinator, publication and ticking.

pub mod backoff;
pub mod coordinator;
pub mod publisher;
pub mod push;
pub mod scheduler;

pub use backoff::Backoff;
pub use coordinator::Coordinator;
pub use publisher::{ListenerId, SnapshotPublisher};
pub use push::{PushClient, PushClientFactory};
pub use scheduler::Scheduler;
