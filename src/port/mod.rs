//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points between the acquisition runtime and
//! the outside world. Adapters implement them over reqwest and
//! tokio-tungstenite; the testkit implements them with scripted fakes.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │   Coordinator runtime   │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     ▼                                                       ▼
//! ┌─────────┐                                          ┌────────────┐
//! │  REST   │                                          │ WebSocket  │
//! │ Adapter │                                          │  Adapter   │
//! └─────────┘                                          └────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`RaceApi`] - Request/response access to the backend resources
//! - [`PushConnector`], [`PushStream`] - Framed full-duplex push transport
//! - [`PushHandle`], [`PushFactory`], [`PushCallbacks`] - Push client lifecycle

pub mod outbound;

pub use outbound::push::{
    DisconnectReason, PushCallbacks, PushConnector, PushFactory, PushFrame, PushHandle, PushStream,
};
pub use outbound::race_api::RaceApi;
