use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod format;

use config::Config;

#[derive(Parser)]
#[command(name = "feedflow")]
#[command(author, version, about = "CLI for FeedFlow aquaculture feeders", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream live telemetry from the feeder
    Watch {
        /// Feeder address (overrides the config file)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Dispense feed now
    Feed {
        /// Feeder address (overrides the config file)
        #[arg(short, long)]
        address: Option<String>,

        /// Amount to dispense, in kilograms
        #[arg(long)]
        amount: f64,

        /// Seconds to wait for the feeder to confirm
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Read one telemetry snapshot
    Status {
        /// Feeder address (overrides the config file)
        #[arg(short, long)]
        address: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Watch { address } => {
            let address = config.resolve_address(address)?;
            commands::watch::run(&address, &config).await
        }
        Commands::Feed {
            address,
            amount,
            timeout,
        } => {
            let address = config.resolve_address(address)?;
            commands::feed::run(&address, &config, amount, Duration::from_secs(timeout)).await
        }
        Commands::Status { address, format } => {
            let address = config.resolve_address(address)?;
            commands::status::run(&address, &config, &format).await
        }
    }
}
