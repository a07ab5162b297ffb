//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::Settings;
use datapulse_core::{DatapulseError, RecordStore};
use serde_json::json;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), DatapulseError> {
    println!("{} starting...", settings.app_name);
    println!();
    println!("Configuration:");
    println!("  Host:       {}", settings.host);
    println!("  Port:       {}", settings.port);
    println!("  Store:      {}", settings.redis_url());
    println!("  Upstream:   {}", settings.external_api.url);
    println!("  Record TTL: {}s", settings.record_ttl_secs);
    println!();

    api::run_server(settings).await
}

// =============================================================================
// HEALTH COMMAND
// =============================================================================

/// Check record store connectivity and print the service health.
pub async fn cmd_health(settings: &Settings, json_mode: bool) -> Result<(), DatapulseError> {
    let store = RecordStore::new(settings.redis_url());
    store.connect().await;
    let healthy = store.is_healthy().await;
    store.disconnect().await;

    let status = if healthy { "healthy" } else { "degraded" };

    if json_mode {
        let out = json!({
            "status": status,
            "app_name": settings.app_name,
            "version": Settings::version(),
            "store": settings.redis_url(),
        });
        println!("{}", out);
    } else {
        println!("{} v{}", settings.app_name, Settings::version());
        println!("  Status: {}", status);
        println!("  Store:  {}", settings.redis_url());
    }
    Ok(())
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Fetch and print a persisted request record.
pub async fn cmd_lookup(
    settings: &Settings,
    json_mode: bool,
    request_id: &str,
) -> Result<(), DatapulseError> {
    let store = RecordStore::new(settings.redis_url());
    store.connect().await;
    let record = store.get(request_id).await;
    store.disconnect().await;

    match record {
        Some(record) => {
            let pretty = serde_json::to_string_pretty(&record)
                .map_err(|e| DatapulseError::Io(format!("Cannot render record: {}", e)))?;
            println!("{}", pretty);
            Ok(())
        }
        None if json_mode => {
            println!("{}", json!({"found": false, "request_id": request_id}));
            Ok(())
        }
        None => {
            println!("No record found for request id {}", request_id);
            println!("(records expire after {}s, and the store must be reachable)", settings.record_ttl_secs);
            Ok(())
        }
    }
}
