// ABOUTME: Entry point for the guest-manager binary.
// ABOUTME: Loads .env and configuration, initializes tracing, and dispatches the parsed command.

mod cli;
mod config;

use clap::Parser;

use crate::cli::Cli;
use crate::config::ManagerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("guest_manager=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ManagerConfig::from_env()?;
    tracing::debug!("using data directory {}", config.home.display());

    cli::run(cli, &config).await
}
