//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Coding-time tracker.
///
/// Accounts wall-clock coding time by calendar day, language, and
/// project, and persists the breakdown as monthly JSON documents.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track a coding session in the foreground.
    ///
    /// Reads control lines from stdin: `lang <id>` switches the active
    /// language, `save` persists immediately, `quit` saves and exits.
    Track {
        /// Project the session's time is attributed to.
        #[arg(long)]
        project: Option<String>,

        /// Language time is attributed to until a `lang` command arrives.
        #[arg(long)]
        language: Option<String>,

        /// Seconds between periodic saves (overrides config).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print one day's recorded breakdown.
    Report {
        /// Day to report, as YYYY/M/D (defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Emit the raw day record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the day-overview sequence consumed by visualizations.
    Overview,
}
