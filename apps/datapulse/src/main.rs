//! # datapulse - Async Data Processing Service
//!
//! The main binary for the datapulse service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based, under /api/v1)
//! - CLI interface for health checks and record lookup
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                apps/datapulse (THE BINARY)               │
//! │                                                          │
//! │   ┌─────────────┐          ┌─────────────┐              │
//! │   │   CLI       │          │  HTTP API   │              │
//! │   │  (clap)     │          │  (axum)     │              │
//! │   └──────┬──────┘          └──────┬──────┘              │
//! │          │                        │                      │
//! │          └───────────┬────────────┘                      │
//! │                      ▼                                   │
//! │            ┌──────────────────┐                          │
//! │            │  datapulse-core  │                          │
//! │            │   (THE LOGIC)    │                          │
//! │            └──────────────────┘                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! datapulse server --host 0.0.0.0 --port 8000
//!
//! # CLI operations
//! datapulse health
//! datapulse lookup -r 7f8c1f1e-...
//! ```

use clap::Parser;
use datapulse::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — DATAPULSE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DATAPULSE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "datapulse=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the datapulse startup banner.
fn print_banner() {
    println!(
        r#"
  datapulse v{}

  Enrich • Transform • Persist (best-effort)
"#,
        env!("CARGO_PKG_VERSION")
    );
}
