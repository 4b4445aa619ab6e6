//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`api`] - `ScriptedApi`, a canned [`RaceApi`](crate::port::RaceApi) with
//!   per-endpoint call counters.
//! - [`push`] - Push fakes: `ScriptedConnector` for the retry loop,
//!   `RecordingPushFactory` for coordinator lifecycle tests.
//! - [`domain`] - Builders for events, participants, weather and push frames.
//! - [`config`] - Canonical test configurations (zero-delay reconnection).

pub mod api;
pub mod config;
pub mod domain;
pub mod push;
