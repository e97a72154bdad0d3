//! The event store port and its in-memory adapter.
//!
//! Streams are append-only. Each append names the version the writer last
//! saw; the store compares it against the stream's current length and
//! either appends every event or none of them. There is no locking: the
//! loser of a race gets [`DbError::ConcurrencyConflict`] and must reload.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorebook_events::{StoredEvent, UncommittedEvent};
use scorebook_types::AggregateKind;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DbError;

/// Append-only per-stream event log with cross-stream queries.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append `events` to `stream_id`, all or nothing.
    ///
    /// With `expected_version` set, the append only happens if the stream
    /// currently holds exactly that many events. Returns the stream version
    /// after the append.
    async fn append(
        &self,
        stream_id: Uuid,
        aggregate_kind: AggregateKind,
        events: Vec<UncommittedEvent>,
        expected_version: Option<u64>,
    ) -> Result<u64, DbError>;

    /// Events of one stream in version order. With `after_version` set,
    /// only events recorded after that version are returned.
    async fn get_events(
        &self,
        stream_id: Uuid,
        after_version: Option<u64>,
    ) -> Result<Vec<StoredEvent>, DbError>;

    /// Every event, oldest first, optionally only those at or after `since`.
    async fn get_all_events(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError>;

    /// Events of one type across all streams, oldest first.
    async fn get_events_by_type(
        &self,
        event_type: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError>;

    /// Events of every stream grouped under one game, oldest first,
    /// optionally restricted to some aggregate kinds.
    async fn get_events_by_aggregate_group(
        &self,
        group_id: Uuid,
        aggregate_kinds: Option<&[AggregateKind]>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError>;
}

#[derive(Debug, Default)]
struct Log {
    /// Every event in commit order.
    events: Vec<StoredEvent>,
    /// Current length of each stream.
    lengths: HashMap<Uuid, u64>,
}

/// Process-local event store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Log>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, since: Option<DateTime<Utc>>, keep: F) -> Vec<StoredEvent>
    where
        F: Fn(&StoredEvent) -> bool + Send,
    {
        let log = self.log.read().await;
        let mut selected: Vec<StoredEvent> = log
            .events
            .iter()
            .filter(|event| since.is_none_or(|since| event.occurred_at >= since))
            .filter(|event| keep(event))
            .cloned()
            .collect();
        // Stable: ties keep commit order.
        selected.sort_by_key(|event| event.occurred_at);
        selected
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        stream_id: Uuid,
        aggregate_kind: AggregateKind,
        events: Vec<UncommittedEvent>,
        expected_version: Option<u64>,
    ) -> Result<u64, DbError> {
        let mut log = self.log.write().await;
        let current = log.lengths.get(&stream_id).copied().unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(DbError::ConcurrencyConflict {
                    stream_id,
                    expected,
                    actual: current,
                });
            }
        }

        let mut version = current;
        let mut stored = Vec::with_capacity(events.len());
        for event in events {
            version = version
                .checked_add(1)
                .ok_or_else(|| DbError::Corrupt(format!("stream {stream_id} version overflow")))?;
            stored.push(StoredEvent::from_uncommitted(
                event,
                stream_id,
                aggregate_kind,
                version,
            ));
        }

        let count = stored.len();
        log.events.extend(stored);
        log.lengths.insert(stream_id, version);

        tracing::debug!(%stream_id, %aggregate_kind, count, version, "Appended events");
        Ok(version)
    }

    async fn get_events(
        &self,
        stream_id: Uuid,
        after_version: Option<u64>,
    ) -> Result<Vec<StoredEvent>, DbError> {
        let after = after_version.unwrap_or(0);
        let log = self.log.read().await;
        Ok(log
            .events
            .iter()
            .filter(|event| event.stream_id == stream_id && event.stream_version > after)
            .cloned()
            .collect())
    }

    async fn get_all_events(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError> {
        Ok(self.select(since, |_| true).await)
    }

    async fn get_events_by_type(
        &self,
        event_type: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError> {
        Ok(self
            .select(since, |event| event.event_type == event_type)
            .await)
    }

    async fn get_events_by_aggregate_group(
        &self,
        group_id: Uuid,
        aggregate_kinds: Option<&[AggregateKind]>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredEvent>, DbError> {
        Ok(self
            .select(since, |event| {
                event.group_id == group_id
                    && aggregate_kinds.is_none_or(|kinds| kinds.contains(&event.aggregate_kind))
            })
            .await)
    }
}
