//! jtbd CLI - theme extraction and clustering for JTBD interview notes
//!
//! Reads interview notes or interview matrices from files or stdin and prints
//! structured JSON or human-readable tables.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging; stdout is reserved for command output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Extract(args) => {
            cli::extract_command(args, cli.config.as_deref()).await?;
        }
        Commands::Cluster(args) => {
            cli::cluster_command(args, cli.config.as_deref()).await?;
        }
        Commands::Run(args) => {
            cli::run_command(args, cli.config.as_deref()).await?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config().await?;
        }
        Commands::InitConfig(args) => {
            cli::init_config(args).await?;
        }
        Commands::ValidateConfig(args) => {
            cli::validate_config(args).await?;
        }
    }

    Ok(())
}
