//! # datapulse CLI Module
//!
//! This module implements the CLI interface for datapulse.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `health` - Check record store connectivity
//! - `lookup` - Fetch a persisted request record by id

mod commands;

use clap::{Parser, Subcommand};
use datapulse_core::DatapulseError;
use std::path::PathBuf;

pub use commands::*;

use crate::config::Settings;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// datapulse - Async Data Processing Service
///
/// Accepts arbitrary JSON payloads, enriches them with data from an
/// external API, and persists request records with a TTL.
#[derive(Parser, Debug)]
#[command(name = "datapulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check record store connectivity
    Health,

    /// Fetch a persisted request record
    Lookup {
        /// Request id of the record to fetch
        #[arg(short, long)]
        request_id: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DatapulseError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            cmd_server(&settings).await
        }
        Some(Commands::Lookup { request_id }) => {
            cmd_lookup(&settings, json_mode, &request_id).await
        }
        // No subcommand - report health by default
        Some(Commands::Health) | None => cmd_health(&settings, json_mode).await,
    }
}
