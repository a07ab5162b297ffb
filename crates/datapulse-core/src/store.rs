//! # Record Store
//!
//! Async key-value persistence for request records, backed by Redis.
//!
//! The store degrades instead of failing: when the connection is absent or
//! an operation errors, `save` returns `false` and `get` returns `None`.
//! Nothing in this module raises to its caller.
//!
//! One `RecordStore` is created at process start and shared by all
//! concurrent calls; the underlying `ConnectionManager` multiplexes them.

use chrono::{SecondsFormat, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::RwLock;

/// Namespace prefix for persisted request records.
const KEY_PREFIX: &str = "request:";

/// Async record store over a single shared Redis connection.
pub struct RecordStore {
    url: String,
    conn: RwLock<Option<ConnectionManager>>,
}

impl RecordStore {
    /// Default record expiration: 24 hours.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a store for the given Redis URL. No connection is made yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: RwLock::new(None),
        }
    }

    /// Establish the managed connection and verify it with PING.
    ///
    /// On failure the store stays disconnected and subsequent operations
    /// behave as "unavailable" — no error is returned.
    pub async fn connect(&self) {
        let client = match redis::Client::open(self.url.as_str()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Invalid Redis URL {}: {}", self.url, e);
                return;
            }
        };

        match ConnectionManager::new(client).await {
            Ok(mut manager) => {
                if let Err(e) = redis::cmd("PING").query_async::<String>(&mut manager).await {
                    tracing::error!("Redis PING failed after connect: {}", e);
                    return;
                }
                tracing::info!("Connected to Redis at {}", self.url);
                *self.conn.write().await = Some(manager);
            }
            Err(e) => {
                tracing::error!("Redis connection failed: {}", e);
            }
        }
    }

    /// Drop the connection. Idempotent; tolerates never having connected.
    pub async fn disconnect(&self) {
        if self.conn.write().await.take().is_some() {
            tracing::info!("Disconnected from Redis");
        }
    }

    /// Clone the manager out of the lock so operations never hold it
    /// across Redis round trips.
    async fn manager(&self) -> Option<ConnectionManager> {
        self.conn.read().await.clone()
    }

    /// Persist `value` plus a `saved_at` timestamp under `request:{key}`
    /// with the given expiration.
    ///
    /// Returns `true` on success, `false` when disconnected or when the
    /// write fails for any reason.
    pub async fn save(&self, key: &str, value: &Map<String, Value>, ttl: Duration) -> bool {
        let Some(mut conn) = self.manager().await else {
            tracing::warn!("Redis not connected, record {} not saved", key);
            return false;
        };

        let mut record = value.clone();
        record.insert(
            "saved_at".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let payload = match serde_json::to_string(&record) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("Failed to serialize record {}: {}", key, e);
                return false;
            }
        };

        let redis_key = format!("{KEY_PREFIX}{key}");
        match conn
            .set_ex::<_, _, ()>(&redis_key, payload, ttl.as_secs())
            .await
        {
            Ok(()) => {
                tracing::info!("Record {} saved", key);
                true
            }
            Err(e) => {
                tracing::error!("Failed to save record {}: {}", key, e);
                false
            }
        }
    }

    /// Read and deserialize the record stored under `request:{key}`.
    ///
    /// Returns `None` when disconnected, missing, or corrupt.
    pub async fn get(&self, key: &str) -> Option<Map<String, Value>> {
        let Some(mut conn) = self.manager().await else {
            tracing::warn!("Redis not connected, record {} not read", key);
            return None;
        };

        let redis_key = format!("{KEY_PREFIX}{key}");
        let raw: Option<String> = match conn.get(&redis_key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Failed to read record {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw?) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!("Corrupt record {}: {}", key, e);
                None
            }
        }
    }

    /// Liveness probe: connected and PING succeeds.
    pub async fn is_healthy(&self) -> bool {
        let Some(mut conn) = self.manager().await else {
            return false;
        };

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn disconnected_store_degrades() {
        let store = RecordStore::new("redis://127.0.0.1:6379/0");

        let mut value = Map::new();
        value.insert("test".into(), json!("data"));

        assert!(!store.save("abc", &value, RecordStore::DEFAULT_TTL).await);
        assert!(store.get("abc").await.is_none());
        assert!(!store.is_healthy().await);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let store = RecordStore::new("redis://127.0.0.1:6379/0");
        store.disconnect().await;
        store.disconnect().await;
        assert!(!store.is_healthy().await);
    }

    #[tokio::test]
    async fn connect_failure_leaves_store_unavailable() {
        // Nothing listens on port 1.
        let store = RecordStore::new("redis://127.0.0.1:1/0");
        store.connect().await;
        assert!(!store.is_healthy().await);
    }

    /// Round trip against a live Redis. Run with `cargo test -- --ignored`
    /// when a local Redis is available.
    #[tokio::test]
    #[ignore]
    async fn save_then_get_round_trips() {
        let store = RecordStore::new("redis://127.0.0.1:6379/0");
        store.connect().await;
        assert!(store.is_healthy().await);

        let mut value = Map::new();
        value.insert("input_data".into(), json!({"k": "v"}));
        value.insert("success".into(), json!(true));

        let key = uuid::Uuid::new_v4().to_string();
        assert!(store.save(&key, &value, Duration::from_secs(60)).await);

        let record = store.get(&key).await.unwrap();
        assert_eq!(record["input_data"], json!({"k": "v"}));
        assert_eq!(record["success"], json!(true));
        assert!(record.contains_key("saved_at"));

        assert!(store.get("no-such-key").await.is_none());
        store.disconnect().await;
    }
}
