//! # datapulse HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints (all under `/api/v1`)
//!
//! - `POST /api/v1/process_data/` - Process a JSON payload
//! - `GET /api/v1/health/` - Health check (healthy/degraded)
//! - `GET /api/v1/` - Service descriptor
//!
//! ## Middleware stack (outer to inner)
//!
//! 1. Panic containment - converts panics to a 500 with a correlation id
//! 2. Tracing - logs all requests
//! 3. CORS - config-driven, localhost-only by default
//! 4. Request logging - per-request id, latency, `X-Request-ID` header
//! 5. Rate limiting - global limit, disabled by default

mod handlers;
mod middleware;
mod types;

// Re-exports for external use and integration tests
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ErrorResponse, HealthResponse, ProcessDataRequest, ProcessDataResponse, RootResponse,
};

use crate::config::Settings;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use datapulse_core::{DatapulseError, FactClient, Processor, RecordStore};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the orchestrator and the record store handle.
///
/// Constructed once at startup and cloned into every request; concurrent
/// calls share the store's single managed connection.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    pub store: Arc<RecordStore>,
    pub app_name: Arc<String>,
}

impl AppState {
    /// Build the full dependency graph from settings.
    ///
    /// The store is not connected yet; callers decide when (the server
    /// connects at startup, tests usually leave it disconnected).
    pub fn from_settings(settings: &Settings) -> Result<Self, DatapulseError> {
        let facts = FactClient::new(&settings.external_api.url, settings.external_api_timeout())?;
        let store = Arc::new(RecordStore::new(settings.redis_url()));
        let processor = Arc::new(Processor::new(
            facts,
            Arc::clone(&store),
            settings.record_ttl(),
        ));

        Ok(Self {
            processor,
            store,
            app_name: Arc::new(settings.app_name.clone()),
        })
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from the configured origin list.
///
/// - `Some("*")`: allows all origins (development mode - use with caution!)
/// - `None`: defaults to localhost only (restrictive default)
/// - Otherwise: parses a comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (cors_origins = \"*\"). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid configured origins, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8000".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// PANIC CONTAINMENT
// =============================================================================

/// Converts an unhandled panic into a generic 500 with a correlation id.
///
/// The orchestrator contains its own failures, so this layer is the last
/// line of defense for bugs outside the pipeline.
#[derive(Clone, Copy)]
struct PanicResponder;

impl ResponseForPanic for PanicResponder {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _err: Box<dyn Any + Send + 'static>,
    ) -> axum::http::Response<Self::ResponseBody> {
        let request_id = Uuid::new_v4().to_string();
        tracing::error!("Unhandled panic while serving request, correlation id: {}", request_id);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(request_id)),
        )
            .into_response()
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let cors = build_cors_layer(settings.cors_origins.as_deref());

    let api = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health/", get(handlers::health_handler))
        .route("/process_data/", post(handlers::process_data_handler));

    let mut router = Router::new().nest("/api/v1", api);

    // Rate limiting (innermost - runs right before the handlers)
    if settings.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", settings.rate_limit);
        let limiter = create_rate_limiter(settings.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(PanicResponder))
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run it until ctrl-c.
///
/// The store connection is best-effort: a missing Redis leaves the service
/// up and degraded, it never blocks startup.
pub async fn run_server(settings: &Settings) -> Result<(), DatapulseError> {
    let state = AppState::from_settings(settings)?;
    state.store.connect().await;

    let store = Arc::clone(&state.store);
    let router = create_router(state, settings);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DatapulseError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("datapulse HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DatapulseError::Io(format!("Server error: {}", e)))?;

    tracing::info!("Shutting down");
    store.disconnect().await;
    Ok(())
}

/// Resolve when the process receives ctrl-c.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install ctrl-c handler");
    }
}
