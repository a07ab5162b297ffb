//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! None of them can fail: malformed bodies are rejected by the `Json`
//! extractor before a handler runs, and the orchestrator always returns a
//! well-formed envelope.

use super::{
    AppState,
    types::{HealthResponse, ProcessDataRequest, ProcessDataResponse, RootResponse},
};
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::Value;

// =============================================================================
// PROCESS DATA HANDLER
// =============================================================================

/// Process an arbitrary JSON object through the pipeline.
///
/// Always answers 200; the `success` flag in the body reflects the internal
/// outcome. An unavailable upstream or store never surfaces as an HTTP
/// error here.
pub async fn process_data_handler(
    State(state): State<AppState>,
    Json(request): Json<ProcessDataRequest>,
) -> impl IntoResponse {
    tracing::info!("Processing request with {} input keys", request.data.len());

    let input = Value::Object(request.data);
    let envelope = state.processor.process(&input).await;

    tracing::info!("Processing finished, request_id: {}", envelope.request_id);
    Json(ProcessDataResponse::from(envelope))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
///
/// "degraded" means the service still answers but the record store failed
/// its liveness probe.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store.is_healthy().await;
    Json(HealthResponse::new(store_healthy, &state.app_name))
}

// =============================================================================
// ROOT HANDLER
// =============================================================================

/// Static service descriptor.
pub async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(RootResponse::new(&state.app_name))
}
