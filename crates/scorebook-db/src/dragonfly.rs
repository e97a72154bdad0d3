//! `Dragonfly` (Redis-compatible) snapshot cache.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `snapshot:{kind}:{id}` | JSON | Latest [`Snapshot`] of one aggregate |

use async_trait::async_trait;
use fred::prelude::*;
use scorebook_events::Snapshot;
use scorebook_types::AggregateKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::DbError;
use crate::snapshot_store::SnapshotStore;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON. Returns `None`
    /// if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(DbError::from)
    }

    /// Delete a key from `Dragonfly`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// A snapshot store over this connection.
    pub fn snapshot_store(&self) -> DragonflySnapshotStore {
        DragonflySnapshotStore { pool: self.clone() }
    }
}

/// Snapshots cached in `Dragonfly` under `snapshot:{kind}:{id}`.
#[derive(Clone)]
pub struct DragonflySnapshotStore {
    pool: DragonflyPool,
}

impl DragonflySnapshotStore {
    /// Create a snapshot store over an existing connection.
    pub const fn new(pool: DragonflyPool) -> Self {
        Self { pool }
    }

    /// Delete the cached snapshot of one aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn evict(&self, aggregate_id: Uuid, aggregate_kind: AggregateKind) -> Result<(), DbError> {
        self.pool.delete(&snapshot_key(aggregate_kind, aggregate_id)).await
    }
}

#[async_trait]
impl SnapshotStore for DragonflySnapshotStore {
    async fn get_snapshot(
        &self,
        aggregate_id: Uuid,
        aggregate_kind: AggregateKind,
    ) -> Result<Option<Snapshot>, DbError> {
        self.pool
            .get_json(&snapshot_key(aggregate_kind, aggregate_id))
            .await
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), DbError> {
        let key = snapshot_key(snapshot.aggregate_kind, snapshot.aggregate_id);
        // Best effort: a racing writer can still land between the read and
        // the write, which at worst leaves an older snapshot cached.
        let kept: Option<Snapshot> = match self.pool.get_json(&key).await {
            Ok(kept) => kept,
            Err(DbError::Serialization(e)) => {
                tracing::warn!(key, error = %e, "Replacing unreadable cached snapshot");
                None
            }
            Err(e) => return Err(e),
        };
        if kept.is_some_and(|kept| kept.version >= snapshot.version) {
            return Ok(());
        }
        self.pool.set_json(&key, snapshot).await?;
        tracing::debug!(key, version = snapshot.version, "Cached snapshot");
        Ok(())
    }
}

fn snapshot_key(kind: AggregateKind, id: Uuid) -> String {
    format!("snapshot:{kind}:{id}")
}
