//! Time-to-live cache for slow-changing sub-resources.

use std::time::Duration;

use tokio::time::Instant;

/// A single cached value with its own refresh interval.
///
/// The value and its fetch time are always set and cleared together, so a
/// cache that has never seen a successful fetch stays empty; failures are
/// never stored.
#[derive(Debug, Clone)]
pub struct CachedResource<T> {
    entry: Option<(T, Instant)>,
    ttl: Duration,
}

impl<T> CachedResource<T> {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.entry.as_ref().map(|(value, _)| value)
    }

    #[must_use]
    pub fn last_fetched(&self) -> Option<Instant> {
        self.entry.as_ref().map(|(_, at)| *at)
    }

    /// True when empty or when at least `ttl` has passed since the last store.
    #[must_use]
    pub fn should_refresh(&self, now: Instant) -> bool {
        match &self.entry {
            None => true,
            Some((_, at)) => now.saturating_duration_since(*at) >= self.ttl,
        }
    }

    /// Record a successful fetch.
    pub fn store(&mut self, value: T, now: Instant) {
        self.entry = Some((value, now));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Move the last fetch time back by `by`, as if the value were older.
    pub fn backdate(&mut self, by: Duration) {
        if let Some((_, at)) = self.entry.as_mut() {
            if let Some(earlier) = at.checked_sub(by) {
                *at = earlier;
            }
        }
    }
}

impl<T: Clone> CachedResource<T> {
    #[must_use]
    pub fn cloned(&self) -> Option<T> {
        self.value().cloned()
    }
}
