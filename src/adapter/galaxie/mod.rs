//! Galaxie backend integration.

pub mod client;
pub mod endpoints;
pub mod stream;

pub use client::GalaxieClient;
pub use endpoints::push_url;
pub use stream::{TungsteniteConnector, TungsteniteStream};
