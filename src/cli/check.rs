//! Handler for the `check-config` command.

use std::io;
use std::path::Path;

use crate::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;

/// Validate a configuration file without contacting the backend.
///
/// Unlike `run`, a missing file is an error here.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::note(&format!("Checking configuration: {}", path.display()));

    if !path.exists() {
        return Err(ConfigError::ReadFile(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
        .into());
    }

    let config = Config::load(path)?;
    output::ok("Configuration file is valid");

    output::section("Backend");
    output::key_value("REST API", &config.api.base_url);
    output::key_value("Push channel", &config.api.ws_url);
    output::key_value("Request timeout", format!("{}ms", config.api.timeout_ms));

    output::section("Refresh");
    output::key_value("Interval", format!("{}s", config.refresh.interval_secs));
    output::key_value("Config TTL", format!("{}s", config.refresh.config_ttl_secs));
    output::key_value("Weather TTL", format!("{}s", config.refresh.weather_ttl_secs));

    output::section("Reconnection");
    output::key_value(
        "Delay",
        format!(
            "{}ms to {}ms (x{})",
            config.reconnection.initial_delay_ms,
            config.reconnection.max_delay_ms,
            config.reconnection.backoff_multiplier
        ),
    );

    output::section("Logging");
    output::key_value("Level", &config.logging.level);
    output::key_value("Format", &config.logging.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn valid_file_passes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh]\ninterval_secs = 5").unwrap();
        assert!(execute_config(file.path()).is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = execute_config("/nonexistent/galaxie.toml");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ReadFile(_)))
        ));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nws_url = \"ftp://galaxie.app\"").unwrap();
        assert!(matches!(
            execute_config(file.path()),
            Err(Error::Config(ConfigError::InvalidValue { field: "ws_url", .. }))
        ));
    }
}
