//! # Core Type Definitions
//!
//! This module contains the domain types shared by the processing pipeline:
//! - External enrichment data (`ExternalFact`)
//! - The per-call response envelope (`Envelope`)
//! - Error types (`DatapulseError`)
//!
//! ## Failure Containment
//!
//! Most pipeline failures never become `DatapulseError` values: the fact
//! client and the record store absorb their own failures into `None`/`false`
//! by contract. The error enum exists for the fallible outer surface
//! (configuration parsing, socket binding).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// EXTERNAL FACT
// =============================================================================

/// One unit of enrichment data fetched from the upstream fact API.
///
/// `length` is whatever the upstream reported; it is never recomputed
/// locally, even when it disagrees with `fact.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalFact {
    pub fact: String,
    pub length: i64,
}

impl Default for ExternalFact {
    fn default() -> Self {
        Self {
            fact: String::new(),
            length: 0,
        }
    }
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// The full result of one processing call.
///
/// Assembled exactly once per call by the orchestrator and immutable
/// afterwards. `success = false` marks a degraded envelope produced by the
/// catch-all failure branch; an absent `external_fact` alone does NOT
/// degrade the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Collision-resistant identifier generated for this call (UUID v4).
    pub request_id: String,
    pub success: bool,
    pub message: String,
    pub processed_data: Map<String, Value>,
    pub external_fact: Option<ExternalFact>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the fallible edges of the system.
#[derive(Debug, Error)]
pub enum DatapulseError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure on the outer surface (e.g. binding the listen socket).
    #[error("I/O error: {0}")]
    Io(String),
}
