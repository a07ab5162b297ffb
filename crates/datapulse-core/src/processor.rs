//! # Processing Orchestrator
//!
//! The core of the pipeline: one linear pass per call that enriches,
//! transforms, persists, and always returns a well-formed envelope.
//!
//! ## Failure Containment
//!
//! `process` is infallible by signature. The fact client and the record
//! store absorb their own failures; the transform-and-assemble section runs
//! under `catch_unwind` so that an unexpected bug degrades the envelope
//! (`success = false`) instead of propagating to the transport layer.

use crate::fact_client::FactClient;
use crate::store::RecordStore;
use crate::transform::transform;
use crate::types::{Envelope, ExternalFact};
use chrono::Utc;
use serde_json::{Map, Value};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Message attached to a successfully processed envelope.
pub const MSG_PROCESSED: &str = "Data processed successfully";

/// Message attached to a degraded envelope.
pub const MSG_FAILED: &str = "Failed to process data";

/// Orchestrates one processing call: id generation, enrichment, transform,
/// envelope assembly, and best-effort persistence.
#[derive(Clone)]
pub struct Processor {
    facts: FactClient,
    store: Arc<RecordStore>,
    ttl: Duration,
}

impl Processor {
    /// Create an orchestrator over the given collaborators.
    ///
    /// `ttl` is the expiration applied to every persisted record.
    pub fn new(facts: FactClient, store: Arc<RecordStore>, ttl: Duration) -> Self {
        Self { facts, store, ttl }
    }

    /// Process one input value into a response envelope.
    ///
    /// Always returns an envelope. An absent external fact keeps
    /// `success = true`; only an unexpected internal failure degrades it.
    /// Persistence is fire-and-forget: a failed save is logged and never
    /// reflected in the envelope.
    pub async fn process(&self, input: &Value) -> Envelope {
        let request_id = Uuid::new_v4().to_string();
        tracing::info!("Processing started, request_id: {}", request_id);

        // Enrichment is resolved first so the persisted record can include
        // whatever the fetch produced.
        let external_fact = self.facts.fetch().await;

        let assembled = catch_unwind(AssertUnwindSafe(|| transform(input)));

        match assembled {
            Ok(processed_data) => {
                let record = success_record(input, &processed_data, external_fact.as_ref());
                self.persist(&request_id, &record).await;

                tracing::info!("Processing finished, request_id: {}", request_id);
                Envelope {
                    request_id,
                    success: true,
                    message: MSG_PROCESSED.to_string(),
                    processed_data,
                    external_fact,
                    timestamp: Utc::now(),
                }
            }
            Err(_) => {
                tracing::error!("Unexpected processing failure, request_id: {}", request_id);

                let record = error_record(input, MSG_FAILED);
                self.persist(&request_id, &record).await;

                Envelope {
                    request_id,
                    success: false,
                    message: MSG_FAILED.to_string(),
                    processed_data: Map::new(),
                    external_fact: None,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    /// Best-effort save: a `false` result is observed in the logs only.
    async fn persist(&self, request_id: &str, record: &Map<String, Value>) {
        if !self.store.save(request_id, record, self.ttl).await {
            tracing::warn!("Record {} not persisted (store unavailable)", request_id);
        }
    }
}

/// Record persisted on the normal path.
fn success_record(
    input: &Value,
    processed_data: &Map<String, Value>,
    external_fact: Option<&ExternalFact>,
) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("input_data".into(), input.clone());
    record.insert(
        "processed_data".into(),
        Value::Object(processed_data.clone()),
    );
    record.insert(
        "external_api_data".into(),
        external_fact
            .and_then(|f| serde_json::to_value(f).ok())
            .unwrap_or(Value::Null),
    );
    record.insert("success".into(), Value::Bool(true));
    record
}

/// Record persisted on the degraded path.
fn error_record(input: &Value, error: &str) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("input_data".into(), input.clone());
    record.insert("error".into(), Value::String(error.to_string()));
    record.insert("success".into(), Value::Bool(false));
    record
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Processor wired to the given upstream URL with a disconnected store.
    fn processor_for(url: String) -> Processor {
        let facts = FactClient::new(url, Duration::from_secs(2)).unwrap();
        let store = Arc::new(RecordStore::new("redis://127.0.0.1:6379/0"));
        Processor::new(facts, store, RecordStore::DEFAULT_TTL)
    }

    #[tokio::test]
    async fn happy_path_assembles_full_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(200)
            .with_body(r#"{"fact": "Cats can rotate their ears 180 degrees.", "length": 42}"#)
            .create_async()
            .await;

        let processor = processor_for(format!("{}/fact", server.url()));
        let input = json!({"test_key": "test_value", "number": 123});
        let envelope = processor.process(&input).await;

        assert!(envelope.success);
        assert_eq!(envelope.message, MSG_PROCESSED);
        assert!(!envelope.request_id.is_empty());

        let fact = envelope.external_fact.unwrap();
        assert_eq!(fact.fact, "Cats can rotate their ears 180 degrees.");
        assert_eq!(fact.length, 42);

        assert_eq!(envelope.processed_data["original_data"], input);
        assert_eq!(
            envelope.processed_data["data_keys"],
            json!(["test_key", "number"]),
        );
    }

    #[tokio::test]
    async fn upstream_failure_keeps_success() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(503)
            .create_async()
            .await;

        let processor = processor_for(format!("{}/fact", server.url()));
        let envelope = processor.process(&json!({"test_key": "test_value"})).await;

        assert!(envelope.success);
        assert!(envelope.external_fact.is_none());
        assert_eq!(envelope.processed_data["original_data"], json!({"test_key": "test_value"}));
    }

    #[tokio::test]
    async fn store_failure_keeps_success() {
        // The store was never connected, so every save returns false; the
        // envelope must not notice.
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(200)
            .with_body(r#"{"fact": "f", "length": 1}"#)
            .create_async()
            .await;

        let processor = processor_for(format!("{}/fact", server.url()));
        let envelope = processor.process(&json!({"a": 1})).await;

        assert!(envelope.success);
        assert!(envelope.external_fact.is_some());
        assert!(!envelope.processed_data.is_empty());
    }

    #[tokio::test]
    async fn empty_object_input_is_processed() {
        let processor = processor_for("http://127.0.0.1:1/fact".to_string());
        let envelope = processor.process(&json!({})).await;

        assert!(envelope.success);
        assert!(envelope.external_fact.is_none());
        assert_eq!(envelope.processed_data["data_keys"], json!([]));
    }

    #[tokio::test]
    async fn request_ids_are_unique_per_call() {
        let processor = processor_for("http://127.0.0.1:1/fact".to_string());
        let first = processor.process(&json!({})).await;
        let second = processor.process(&json!({})).await;
        assert_ne!(first.request_id, second.request_id);
    }
}
