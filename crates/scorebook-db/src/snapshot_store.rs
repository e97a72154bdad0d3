//! The snapshot store port, its in-memory adapter, and the `PostgreSQL`
//! `snapshots` table.
//!
//! Snapshots are a cache over the event log. Stores keep at most one per
//! aggregate and never replace a snapshot with an older one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorebook_events::Snapshot;
use scorebook_types::AggregateKind;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DbError;

/// Latest-snapshot-per-aggregate storage.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The most recent snapshot of one aggregate, if any.
    async fn get_snapshot(
        &self,
        aggregate_id: Uuid,
        aggregate_kind: AggregateKind,
    ) -> Result<Option<Snapshot>, DbError>;

    /// Store `snapshot` unless a newer one is already kept.
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), DbError>;
}

/// Process-local snapshot store.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<(AggregateKind, Uuid), Snapshot>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots kept.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Whether no snapshot is kept.
    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get_snapshot(
        &self,
        aggregate_id: Uuid,
        aggregate_kind: AggregateKind,
    ) -> Result<Option<Snapshot>, DbError> {
        Ok(self
            .snapshots
            .read()
            .await
            .get(&(aggregate_kind, aggregate_id))
            .cloned())
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), DbError> {
        let mut snapshots = self.snapshots.write().await;
        let key = (snapshot.aggregate_kind, snapshot.aggregate_id);
        let newer = snapshots
            .get(&key)
            .is_none_or(|kept| kept.version < snapshot.version);
        if newer {
            snapshots.insert(key, snapshot.clone());
        }
        Ok(())
    }
}

/// Snapshots in the `snapshots` table.
#[derive(Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// Create a snapshot store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn get_snapshot(
        &self,
        aggregate_id: Uuid,
        aggregate_kind: AggregateKind,
    ) -> Result<Option<Snapshot>, DbError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r"SELECT aggregate_id, aggregate_kind, version, state, taken_at
              FROM snapshots
              WHERE aggregate_id = $1 AND aggregate_kind = $2",
        )
        .bind(aggregate_id)
        .bind(aggregate_kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SnapshotRow::into_snapshot).transpose()
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), DbError> {
        let version = i64::try_from(snapshot.version)
            .map_err(|e| DbError::Corrupt(format!("snapshot version out of range: {e}")))?;

        // The WHERE clause keeps a newer snapshot written by a racing save.
        sqlx::query(
            r"INSERT INTO snapshots (aggregate_id, aggregate_kind, version, state, taken_at)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (aggregate_id, aggregate_kind) DO UPDATE SET
                version = EXCLUDED.version,
                state = EXCLUDED.state,
                taken_at = EXCLUDED.taken_at
              WHERE snapshots.version < EXCLUDED.version",
        )
        .bind(snapshot.aggregate_id)
        .bind(snapshot.aggregate_kind.as_str())
        .bind(version)
        .bind(&snapshot.state)
        .bind(snapshot.taken_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            aggregate_id = %snapshot.aggregate_id,
            aggregate_kind = %snapshot.aggregate_kind,
            version = snapshot.version,
            "Saved snapshot"
        );
        Ok(())
    }
}

/// A row from the `snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SnapshotRow {
    aggregate_id: Uuid,
    aggregate_kind: String,
    version: i64,
    state: serde_json::Value,
    taken_at: DateTime<Utc>,
}

impl SnapshotRow {
    fn into_snapshot(self) -> Result<Snapshot, DbError> {
        let aggregate_kind = AggregateKind::parse(&self.aggregate_kind).ok_or_else(|| {
            DbError::Corrupt(format!("unknown aggregate kind {}", self.aggregate_kind))
        })?;
        let version = u64::try_from(self.version)
            .map_err(|e| DbError::Corrupt(format!("negative snapshot version: {e}")))?;
        Ok(Snapshot {
            aggregate_id: self.aggregate_id,
            aggregate_kind,
            version,
            state: self.state,
            taken_at: self.taken_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, version: u64) -> Snapshot {
        Snapshot {
            aggregate_id: id,
            aggregate_kind: AggregateKind::InningState,
            version,
            state: serde_json::json!({ "version": version }),
            taken_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn keeps_the_newest_snapshot() {
        let store = InMemorySnapshotStore::new();
        let id = Uuid::now_v7();

        store.save_snapshot(&snapshot(id, 10)).await.unwrap();
        store.save_snapshot(&snapshot(id, 5)).await.unwrap();
        let kept = store
            .get_snapshot(id, AggregateKind::InningState)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.version, 10);

        store.save_snapshot(&snapshot(id, 20)).await.unwrap();
        let kept = store
            .get_snapshot(id, AggregateKind::InningState)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.version, 20);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn snapshots_are_keyed_by_kind() {
        let store = InMemorySnapshotStore::new();
        let id = Uuid::now_v7();
        store.save_snapshot(&snapshot(id, 1)).await.unwrap();
        assert!(
            store
                .get_snapshot(id, AggregateKind::Game)
                .await
                .unwrap()
                .is_none()
        );
    }
}
