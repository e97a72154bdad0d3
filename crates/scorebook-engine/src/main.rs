//! Operator binary for the Scorebook live game tracker.
//!
//! Opens inning states, and rebuilds, snapshots, and inspects the event
//! streams the data layer keeps. Output is JSON, one document per line, on
//! stdout; logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `scorebook-config.yaml` (or `SCOREBOOK_CONFIG`)
//! 3. Initialize structured logging (tracing)
//! 4. Connect to `PostgreSQL`, apply migrations, open the snapshot backend
//! 5. Run the command and print its output

mod cli;
mod commands;
mod error;
mod stores;

use std::io::Write as _;

use clap::Parser as _;
use scorebook_core::ScorebookConfig;
use scorebook_core::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::EngineError;
use crate::stores::Stores;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, store setup, or the command fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse the command line.
    let cli = Cli::parse();

    // 2. Load configuration.
    let config = ScorebookConfig::load().map_err(EngineError::from)?;

    // 3. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        snapshots_enabled = config.snapshots.enabled,
        snapshot_backend = ?config.snapshots.backend,
        every_n_events = config.snapshots.every_n_events,
        batting_order_size = config.game.batting_order_size,
        "Configuration loaded"
    );

    // 4. Connect to the stores.
    let stores = Stores::connect(&config).await?;

    // 5. Run the command.
    let result = commands::run(&cli.command, &stores, &config.game).await;
    stores.close().await;
    let lines = result?;

    let mut stdout = std::io::stdout().lock();
    for line in &lines {
        writeln!(stdout, "{line}")?;
    }

    info!(lines = lines.len(), "scorebook-engine done");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
