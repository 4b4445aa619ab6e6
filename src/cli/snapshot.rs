//! Handler for the `snapshot` command.

use crate::cli::ConfigPathArg;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;

/// Run a single refresh and print the resulting snapshot as JSON.
///
/// Logs stay at `warn` so stdout carries only the document.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    config.logging.level = "warn".to_string();
    config.init_logging();

    let coordinator = bootstrap::build_coordinator(&config);
    let refreshed = coordinator.refresh().await;
    coordinator.shutdown().await;

    let snapshot = refreshed?;
    println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    Ok(())
}
