//! Lumen CLI - Headless driver for the playback controller
//!
//! Features:
//! - Scripted replay of host input and engine events
//! - MIME inference for media URLs
//! - Media error classification
//! - Configuration defaults and validation

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod script;

/// Lumen CLI - Playback controller toolkit
#[derive(Parser)]
#[command(name = "lumen-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Replay and inspect the Lumen playback controller", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON script of timestamped inputs and engine events
    Replay {
        /// Path to the script
        script: PathBuf,

        /// Fire timers still pending after the last step
        #[arg(long)]
        settle: bool,
    },

    /// Print the MIME type inferred from a media URL
    Mime {
        /// Media URL
        url: String,
    },

    /// Classify an engine error code for a media URL
    Classify {
        /// Media URL
        url: String,

        /// Numeric media error code
        code: u16,
    },

    /// Print the default configuration
    Config {
        /// Validate this configuration file instead
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let level = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr);
    if cli.log_format.eq_ignore_ascii_case("json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    lumen_core::init();
    let format = output::OutputFormat::from(cli.format.as_str());

    match cli.command {
        Commands::Replay { script, settle } => {
            commands::replay(&script, settle, format)?;
        }
        Commands::Mime { url } => {
            commands::mime(&url, format)?;
        }
        Commands::Classify { url, code } => {
            commands::classify(&url, code, format)?;
        }
        Commands::Config { check } => {
            commands::config(check.as_deref())?;
        }
    }

    Ok(())
}
