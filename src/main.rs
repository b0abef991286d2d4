//! buildmemo - build-scoped memoization
//!
//! CLI entry point that dispatches to subcommands.

use buildmemo::cli::{Cli, Commands};
use buildmemo::config::{Config, ConfigManager};
use buildmemo::error::BuildMemoResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BuildMemoResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    // Dispatch to command
    match cli.command {
        Commands::Version(args) => buildmemo::cli::commands::version(args, &config).await,
        Commands::Build(args) => buildmemo::cli::commands::build(args, &config).await,
        Commands::Config(args) => {
            buildmemo::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Initialize logging: 0 = info, 1 = debug, 2+ = trace. Logs go to stderr.
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("buildmemo=info"),
        1 => EnvFilter::new("buildmemo=debug"),
        _ => EnvFilter::new("buildmemo=trace"),
    };

    if config.general.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}
