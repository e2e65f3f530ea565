use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally_cli::commands::{export, listen, record, status, today};
use tally_cli::{Cli, Commands, Config};
use tally_core::SystemClock;
use tally_db::DailyCounterStore;

/// Load config and open the counter store at the configured path.
fn open_store(config_path: Option<&Path>) -> Result<(DailyCounterStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = DailyCounterStore::open(&config.database_path, SystemClock)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Status) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            status::run(&mut stdout, &store, &config.database_path)?;
        }
        Some(Commands::Record { category }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            record::run(&mut stdout, &store, category)?;
        }
        Some(Commands::Today { json }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            today::run(&mut stdout, &store, *json)?;
        }
        Some(Commands::Listen) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let stats = listen::run(io::stdin().lock(), &mut stdout, &store)?;
            tracing::info!(
                recorded = stats.recorded,
                dropped = stats.dropped,
                "input stream closed"
            );
        }
        Some(Commands::Export) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let count = export::run(&mut stdout, &store)?;
            tracing::debug!(count, "exported day totals");
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
