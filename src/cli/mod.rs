//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;
pub mod snapshot;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Galaxie - Live motorsport data acquisition.
#[derive(Parser, Debug)]
#[command(name = "galaxie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the backend and follow live runs until interrupted
    Run(RunArgs),

    /// Fetch one snapshot and print it as JSON
    Snapshot(ConfigPathArg),

    /// Validate configuration file
    CheckConfig(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
