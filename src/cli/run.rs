//! Handler for the `run` command.

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::cli::{output, RunArgs};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;
use crate::runtime::Scheduler;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();
    info!(
        api = %config.api.base_url,
        interval_secs = config.refresh.interval_secs,
        "galaxie starting"
    );

    let coordinator = bootstrap::build_coordinator(&config);
    coordinator.publisher().subscribe(|snapshot| {
        output::note(&output::summary(snapshot));
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(coordinator, config.refresh.interval());
    let mut task = tokio::spawn(scheduler.run(shutdown_rx));

    let scheduler_exited = tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            false
        }
        result = &mut task => {
            if let Err(e) = result {
                error!(error = %e, "Scheduler task failed");
            }
            true
        }
    };

    if !scheduler_exited {
        let _ = shutdown_tx.send(true);
        if let Err(e) = task.await {
            error!(error = %e, "Scheduler task failed");
        }
    }

    info!("galaxie stopped");
    Ok(())
}
