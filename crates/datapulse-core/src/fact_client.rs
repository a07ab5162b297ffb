//! # External Fact Client
//!
//! Best-effort HTTP client for the upstream fact API
//! (default: `https://catfact.ninja/fact`).
//!
//! Every failure mode — connection error, timeout, non-2xx status,
//! unparsable body — is normalized into `None`. Callers never see an error
//! from this component, and no retries are attempted.

use crate::types::{DatapulseError, ExternalFact};
use std::time::Duration;

/// HTTP client that wraps calls to the upstream fact API.
#[derive(Debug, Clone)]
pub struct FactClient {
    http: reqwest::Client,
    url: String,
}

impl FactClient {
    /// Create a new client for the given upstream URL.
    ///
    /// The timeout bounds the whole request, connect included.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DatapulseError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DatapulseError::Io(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetch one fact from the upstream API.
    ///
    /// Returns `None` on any failure; the reason is logged at warn level.
    /// `length` is taken verbatim from the upstream body.
    pub async fn fetch(&self) -> Option<ExternalFact> {
        tracing::debug!("Fetching fact from upstream: {}", self.url);

        let response = match self.http.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                tracing::warn!("Upstream fact request timed out: {}", self.url);
                return None;
            }
            Err(e) => {
                tracing::warn!("Upstream fact request failed: {}", e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    "Upstream fact API returned error status: {}",
                    e.status().map_or_else(|| "unknown".into(), |s| s.to_string()),
                );
                return None;
            }
        };

        match response.json::<ExternalFact>().await {
            Ok(fact) => {
                tracing::info!("Received fact from upstream ({} chars)", fact.fact.len());
                Some(fact)
            }
            Err(e) => {
                tracing::warn!("Unparsable body from upstream fact API: {}", e);
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> FactClient {
        FactClient::new(format!("{}/fact", server.url()), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn fetch_parses_well_formed_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"fact": "Cats can rotate their ears 180 degrees.", "length": 42}"#)
            .create_async()
            .await;

        let fact = client_for(&server).fetch().await.unwrap();
        assert_eq!(fact.fact, "Cats can rotate their ears 180 degrees.");
        assert_eq!(fact.length, 42);
    }

    #[tokio::test]
    async fn fetch_defaults_missing_fields() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(200)
            .with_body(r#"{"fact": "short"}"#)
            .create_async()
            .await;

        // length is absent upstream — defaulted, not recomputed from the fact
        let fact = client_for(&server).fetch().await.unwrap();
        assert_eq!(fact.fact, "short");
        assert_eq!(fact.length, 0);
    }

    #[tokio::test]
    async fn fetch_absorbs_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(500)
            .create_async()
            .await;

        assert!(client_for(&server).fetch().await.is_none());
    }

    #[tokio::test]
    async fn fetch_absorbs_unparsable_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fact")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        assert!(client_for(&server).fetch().await.is_none());
    }

    #[tokio::test]
    async fn fetch_absorbs_connection_refused() {
        // Port 1 is essentially guaranteed to refuse connections.
        let client = FactClient::new("http://127.0.0.1:1/fact", Duration::from_secs(1)).unwrap();
        assert!(client.fetch().await.is_none());
    }
}
