mod commands;
mod export;
mod render;
mod source;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::source::PageSource;

#[derive(Debug, Parser)]
#[command(name = "clipstat")]
#[command(about = "Profile and video stats from short-video pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    /// Pro only
    Csv,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a profile page for its videos and view counts
    Scan {
        #[command(flatten)]
        source: PageSource,
        /// Open each video to recover likes and comments (Pro)
        #[arg(long)]
        deep: bool,
        /// Videos to deep scan, clamped to 1..=20
        #[arg(long)]
        deep_limit: Option<usize>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Rows shown in the table view
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Read views, likes and comments from a single video page
    Video {
        #[command(flatten)]
        source: PageSource,
        #[arg(long)]
        json: bool,
    },
    /// Summary statistics for a saved scan (`scan --format json`)
    Stats {
        input: PathBuf,
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Compare two saved scans
    Compare {
        /// Earlier scan
        a: PathBuf,
        /// Current scan
        b: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Manage the Pro license token
    License {
        #[command(subcommand)]
        command: LicenseCommands,
    },
}

#[derive(Debug, Subcommand)]
enum LicenseCommands {
    /// Store a token and validate it immediately
    Set { token: String },
    /// Show current entitlement
    Status {
        /// Ignore the cached answer
        #[arg(long)]
        refresh: bool,
    },
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = clipstat_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Scan {
            source,
            deep,
            deep_limit,
            format,
            top,
        } => commands::run_scan(&config, &source, deep, deep_limit, format, top).await,
        Commands::Video { source, json } => commands::run_video(&config, &source, json).await,
        Commands::Stats { input, top } => commands::run_stats(&input, top),
        Commands::Compare { a, b, json } => commands::run_compare(&a, &b, json),
        Commands::License { command } => match command {
            LicenseCommands::Set { token } => commands::run_license_set(&config, &token).await,
            LicenseCommands::Status { refresh } => {
                commands::run_license_status(&config, refresh).await
            }
        },
    }
}

#[cfg(test)]
mod tests;
