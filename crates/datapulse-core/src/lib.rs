//! # datapulse-core
//!
//! The request-processing pipeline for datapulse - THE LOGIC.
//!
//! One processing call flows through a single linear pipeline:
//!
//! ```text
//! caller → Processor → { FactClient, transform } → envelope → RecordStore
//! ```
//!
//! ## Failure Containment Contract
//!
//! The pipeline always produces a well-formed envelope:
//! - The fact client absorbs upstream failures into `None`
//! - The record store absorbs persistence failures into `false`/`None`
//! - The orchestrator converts anything unexpected into a degraded
//!   envelope (`success = false`) instead of an error
//!
//! The HTTP/CLI surface lives in `apps/datapulse`; this crate has no
//! transport-framework dependencies.

// =============================================================================
// MODULES
// =============================================================================

pub mod fact_client;
pub mod processor;
pub mod store;
pub mod transform;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use fact_client::FactClient;
pub use processor::{MSG_FAILED, MSG_PROCESSED, Processor};
pub use store::RecordStore;
pub use transform::transform;
pub use types::{DatapulseError, Envelope, ExternalFact};
