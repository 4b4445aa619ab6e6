//! Galaxie - Live and scheduled race data as an always-fresh snapshot.
//!
//! A [`runtime::Coordinator`] polls the Galaxie REST API on a fixed tick
//! and, while a run is live, follows it over a resilient push channel.
//! Every tick publishes an immutable [`domain::Snapshot`] that readers can
//! observe through listeners or a watch channel.
//!
//! # Architecture
//!
//! - **`domain`** - Events, participants, weather, backend config, snapshots
//! - **`port`** - Traits at the edges: REST API, push connector, push factory
//! - **`adapter::galaxie`** - reqwest and tokio-tungstenite implementations
//! - **`runtime`** - Coordinator, push client, publisher, scheduler
//! - **`infrastructure`** - TOML configuration, logging and wiring
//!
//! # Example
//!
//! ```no_run
//! use galaxie::infrastructure::{bootstrap, config::Config};
//!
//! # async fn demo() -> galaxie::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let coordinator = bootstrap::build_coordinator(&config);
//! let snapshot = coordinator.refresh().await?;
//! println!("live: {}", snapshot.is_live());
//! coordinator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
pub mod runtime;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
