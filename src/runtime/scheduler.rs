//! Fixed-interval tick driver.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::coordinator::Coordinator;

/// Drives [`Coordinator::refresh`] on a fixed interval until shutdown.
pub struct Scheduler {
    coordinator: Coordinator,
    interval: Duration,
}

impl Scheduler {
    #[must_use]
    pub const fn new(coordinator: Coordinator, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Tick until `shutdown` turns true or its sender is dropped, then shut
    /// the coordinator down.
    ///
    /// The first tick runs immediately. A tick that overruns delays the
    /// following ones instead of bunching them up.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        loop {
            if *shutdown.borrow() {
                info!("Shutdown signal received");
                break;
            }

            tokio::select! {
                biased;
                result = shutdown.changed() => {
                    if result.is_err() {
                        info!("Shutdown channel closed");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.coordinator.refresh().await {
                        warn!(error = %e, "Refresh failed, keeping last snapshot");
                    }
                }
            }
        }

        self.coordinator.shutdown().await;
        info!("Scheduler stopped");
    }
}
