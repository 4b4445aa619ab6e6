use clap::Parser;
use galaxie::cli::{self, output, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Snapshot(args) => cli::snapshot::execute(args).await,
        Commands::CheckConfig(args) => cli::check::execute_config(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
