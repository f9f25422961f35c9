use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{overview, report, track};
use ct_cli::{Cli, Commands, Config};
use ct_store::JsonStore;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = JsonStore::new(&config.data_dir);

    match &cli.command {
        Some(Commands::Track {
            project,
            language,
            interval,
        }) => {
            let interval = Duration::from_secs(interval.unwrap_or(config.interval_secs));
            track::run(&store, project.clone(), language.clone(), interval)?;
        }
        Some(Commands::Report { date, json }) => {
            let mut stdout = io::stdout().lock();
            report::run(&mut stdout, &store, date.as_deref(), *json)?;
        }
        Some(Commands::Overview) => {
            let mut stdout = io::stdout().lock();
            overview::run(&mut stdout, &store)?;
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
