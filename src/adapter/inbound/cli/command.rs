//! Command-line interface definitions.
//!
//! Defines the CLI structure for the trendsync application using `clap`.
//! Subcommands cover running a full collect-and-sync cycle, rebuilding rows
//! from the persisted master cache, and printing the stored digest.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trend keyword collection and cache-coherent sync CLI
#[derive(Parser, Debug)]
#[command(name = "trendsync")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "trendsync.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the trendsync CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one collect-and-sync cycle for a topic
    Run(RunArgs),

    /// Rebuild one day's rows from the persisted master cache
    Sync(SyncArgs),

    /// Print the stored trend digest for a topic
    Report(ReportArgs),
}

/// Arguments for `trendsync run`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Topic to analyze
    pub topic: String,

    /// Channel the records come from
    #[arg(long, default_value = "youtube")]
    pub channel: String,

    /// Trailing window in days, ending today
    #[arg(long, default_value_t = 30)]
    pub window_days: u32,
}

/// Arguments for `trendsync sync`.
#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Topic to rebuild rows for
    pub topic: String,

    /// Channel the records come from
    #[arg(long, default_value = "youtube")]
    pub channel: String,

    /// Day to rebuild (defaults to today, UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Arguments for `trendsync report`.
#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Topic to report on
    pub topic: String,

    /// Channel the records come from
    #[arg(long, default_value = "youtube")]
    pub channel: String,
}
