//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. Wire field names follow the public
//! contract (`processed_data`, `external_api_data`, ...), independent of
//! the core's internal naming.

use chrono::{DateTime, Utc};
use datapulse_core::{Envelope, ExternalFact};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// PROCESS DATA REQUEST/RESPONSE
// =============================================================================

/// Body of `POST /api/v1/process_data/`.
///
/// `data` must be a JSON object; the `Json` extractor rejects anything
/// else with 422 before the orchestrator is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDataRequest {
    pub data: Map<String, Value>,
}

/// Response of `POST /api/v1/process_data/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDataResponse {
    pub success: bool,
    pub message: String,
    pub processed_data: Map<String, Value>,
    pub external_api_data: Option<ExternalFact>,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl From<Envelope> for ProcessDataResponse {
    fn from(envelope: Envelope) -> Self {
        Self {
            success: envelope.success,
            message: envelope.message,
            processed_data: envelope.processed_data,
            external_api_data: envelope.external_fact,
            timestamp: envelope.timestamp,
            request_id: envelope.request_id,
        }
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Response of `GET /api/v1/health/`.
///
/// `status` is "healthy" when the record store answers its liveness probe,
/// "degraded" otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub app_name: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(store_healthy: bool, app_name: &str) -> Self {
        Self {
            status: if store_healthy { "healthy" } else { "degraded" }.to_string(),
            app_name: app_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// ROOT RESPONSE
// =============================================================================

/// Static service descriptor returned by `GET /api/v1/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub health: String,
}

impl RootResponse {
    pub fn new(app_name: &str) -> Self {
        Self {
            message: app_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            health: "/api/v1/health/".to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of a 500 produced by the panic-containment layer.
///
/// The orchestrator is designed never to trigger this; it exists for
/// truly catastrophic failures and carries a correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl ErrorResponse {
    pub fn internal(request_id: String) -> Self {
        Self {
            success: false,
            error: "Internal Server Error".to_string(),
            detail: Some("An unexpected internal error occurred".to_string()),
            timestamp: Utc::now(),
            request_id,
        }
    }
}
