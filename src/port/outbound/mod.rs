//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the backend dependencies: the REST resources
//! and the per-run push channel.

pub mod push;
pub mod race_api;
