//! Exponential backoff with jitter for push reconnection.

use std::time::Duration;

use rand::Rng;

use crate::infrastructure::config::ReconnectionConfig;

/// Running backoff state for one push client.
///
/// Each call to [`next_delay`](Self::next_delay) returns the current base
/// delay plus up to 50% random jitter, then advances the base by the
/// multiplier up to the ceiling. [`reset`](Self::reset) after a successful
/// connection starts the sequence over.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    multiplier: f64,
    current_ms: u64,
}

impl Backoff {
    #[must_use]
    pub fn new(config: &ReconnectionConfig) -> Self {
        Self {
            initial_ms: config.initial_delay_ms,
            max_ms: config.max_delay_ms,
            multiplier: config.backoff_multiplier,
            current_ms: config.initial_delay_ms.min(config.max_delay_ms),
        }
    }

    /// Base delay the next call will use, before jitter.
    #[must_use]
    pub const fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    /// Reset backoff state after a successful connection.
    pub fn reset(&mut self) {
        self.current_ms = self.initial_ms.min(self.max_ms);
    }

    /// Calculate the next backoff delay using exponential backoff with jitter.
    ///
    /// Returns the current delay and advances the internal delay state for
    /// the next call.
    pub fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_ms);
        let delay = base_delay + Self::jitter(base_delay);

        // Increase delay for next attempt
        let next_ms = (self.current_ms as f64 * self.multiplier) as u64;
        self.current_ms = next_ms.min(self.max_ms);

        delay
    }

    /// Uniform jitter over `[0, base / 2]`.
    fn jitter(base_delay: Duration) -> Duration {
        let range_ms = (base_delay.as_millis() as u64) / 2;
        if range_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=range_ms))
    }
}
