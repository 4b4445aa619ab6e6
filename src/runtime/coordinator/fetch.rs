//! Degrading wrappers around backend calls.
//!
//! A failed fetch never fails the tick: lists degrade to empty and objects
//! to `None`, with a warning naming the resource.

use std::future::Future;

use tracing::{debug, warn};

use crate::domain::Event;
use crate::error::Result;

pub(super) async fn list<F>(resource: &'static str, request: F) -> Vec<Event>
where
    F: Future<Output = Result<Vec<Event>>>,
{
    match request.await {
        Ok(events) => {
            debug!(resource, count = events.len(), "Fetched events");
            events
        }
        Err(e) => {
            warn!(resource, error = %e, "Fetch failed, using empty list");
            Vec::new()
        }
    }
}

pub(super) async fn object<T, F>(resource: &'static str, request: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match request.await {
        Ok(value) => {
            debug!(resource, "Fetched");
            Some(value)
        }
        Err(e) => {
            warn!(resource, error = %e, "Fetch failed");
            None
        }
    }
}
