//! Event-sourced repositories: the only place aggregates meet the stores.
//!
//! Saving appends an aggregate's pending events under an expected-version
//! check and then, if the stream crossed a snapshot boundary, tries to
//! refresh its snapshot. Loading tries the latest snapshot plus the events
//! after it and falls back to replaying the whole stream.
//!
//! Snapshot problems never fail a save or a load: they are logged and the
//! repository carries on without the snapshot.

use std::marker::PhantomData;
use std::sync::Arc;

use scorebook_core::{
    Aggregate, DomainError, ReplayError, Tracked, from_history, from_snapshot, snapshot_of,
};
use scorebook_events::{CodecError, Decoded, EventMetadata, Snapshot, StoredEvent, decode, encode};
use scorebook_types::AggregateKind;
use uuid::Uuid;

use crate::error::DbError;
use crate::event_store::EventStore;
use crate::snapshot_store::SnapshotStore;

/// Source recorded in the metadata of events saved by a repository unless
/// overridden with [`EventSourcedRepository::with_source`].
pub const DEFAULT_EVENT_SOURCE: &str = "scorebook-db";

/// Broad class of a [`RepositoryError`], for callers that only branch on
/// what kind of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// The aggregate has no events.
    NotFound,
    /// The stream moved on since the aggregate was loaded.
    ConcurrencyConflict,
    /// A domain rule rejected the change.
    ValidationFailure,
    /// The event store could not be reached or refused the operation.
    StoreUnavailable,
    /// The stream cannot be turned back into an aggregate.
    CorruptStream,
}

/// Errors surfaced to callers of a repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No events exist for the requested aggregate.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind requested.
        kind: AggregateKind,
        /// Id requested.
        id: Uuid,
    },

    /// The stream is not at the version the aggregate was loaded at.
    #[error("concurrency conflict on {stream_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The stream.
        stream_id: Uuid,
        /// Version the save expected.
        expected: u64,
        /// Version the store is at.
        actual: u64,
    },

    /// A mutation was rejected.
    #[error("validation failed: {0}")]
    Validation(#[from] DomainError),

    /// The event store failed.
    #[error("event store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    /// A stored event could not be decoded.
    #[error("corrupt stream: {0}")]
    Codec(#[from] CodecError),

    /// The stream could not be replayed.
    #[error("corrupt stream: {0}")]
    Replay(#[from] ReplayError),

    /// The stream is structurally broken (gaps, kind mix-ups).
    #[error("corrupt stream {stream_id}: {reason}")]
    CorruptStream {
        /// The stream.
        stream_id: Uuid,
        /// What is wrong with it.
        reason: String,
    },
}

impl RepositoryError {
    /// The broad class of this error.
    pub const fn kind(&self) -> RepositoryErrorKind {
        match self {
            Self::NotFound { .. } => RepositoryErrorKind::NotFound,
            Self::ConcurrencyConflict { .. } => RepositoryErrorKind::ConcurrencyConflict,
            Self::Validation(_) => RepositoryErrorKind::ValidationFailure,
            Self::StoreUnavailable(_) => RepositoryErrorKind::StoreUnavailable,
            Self::Codec(_) | Self::Replay(_) | Self::CorruptStream { .. } => {
                RepositoryErrorKind::CorruptStream
            }
        }
    }
}

impl From<DbError> for RepositoryError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::ConcurrencyConflict {
                stream_id,
                expected,
                actual,
            } => Self::ConcurrencyConflict {
                stream_id,
                expected,
                actual,
            },
            DbError::Codec(e) => Self::Codec(e),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// When a save refreshes the aggregate's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPolicy {
    every_n_events: u64,
}

impl SnapshotPolicy {
    /// Snapshot each time a stream crosses a multiple of `every_n_events`.
    /// Zero disables snapshotting.
    pub const fn every(every_n_events: u64) -> Self {
        Self { every_n_events }
    }

    /// The configured interval.
    pub const fn every_n_events(self) -> u64 {
        self.every_n_events
    }

    /// Whether moving a stream from `before` to `after` crosses a
    /// snapshot boundary.
    pub const fn crosses_boundary(self, before: u64, after: u64) -> bool {
        match (
            before.checked_div(self.every_n_events),
            after.checked_div(self.every_n_events),
        ) {
            (Some(b), Some(a)) => a > b,
            _ => false,
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::every(50)
    }
}

struct Snapshots {
    store: Arc<dyn SnapshotStore>,
    policy: SnapshotPolicy,
}

/// Loads and saves one aggregate type.
pub struct EventSourcedRepository<A: Aggregate> {
    events: Arc<dyn EventStore>,
    snapshots: Option<Snapshots>,
    source: String,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> EventSourcedRepository<A> {
    /// A repository without snapshot support.
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self {
            events,
            snapshots: None,
            source: DEFAULT_EVENT_SOURCE.to_owned(),
            _aggregate: PhantomData,
        }
    }

    /// Enable snapshots.
    #[must_use]
    pub fn with_snapshots(mut self, store: Arc<dyn SnapshotStore>, policy: SnapshotPolicy) -> Self {
        self.snapshots = Some(Snapshots { store, policy });
        self
    }

    /// Record `source` in the metadata of saved events.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether this repository reads and writes snapshots.
    pub const fn snapshots_enabled(&self) -> bool {
        self.snapshots.is_some()
    }

    /// Append the aggregate's pending events. Returns the stream version
    /// after the save.
    ///
    /// Pending events are cleared only if the append succeeds. On a
    /// concurrency conflict nothing is written and the caller must reload.
    pub async fn save(&self, tracked: &mut Tracked<A>) -> Result<u64, RepositoryError> {
        self.save_with_metadata(tracked, EventMetadata::new(self.source.as_str()))
            .await
    }

    /// [`save`](Self::save) with caller-supplied metadata (correlation and
    /// causation ids).
    pub async fn save_with_metadata(
        &self,
        tracked: &mut Tracked<A>,
        metadata: EventMetadata,
    ) -> Result<u64, RepositoryError> {
        let stream_id = tracked.state().stream_id();
        let expected = tracked.expected_version();
        if tracked.pending().is_empty() {
            return Ok(expected);
        }

        let encoded = tracked
            .pending()
            .iter()
            .map(|event| encode(event, &metadata))
            .collect::<Result<Vec<_>, _>>()?;
        let count = encoded.len();

        let version = self
            .events
            .append(stream_id, A::kind(), encoded, Some(expected))
            .await?;
        tracked.mark_committed();

        tracing::debug!(%stream_id, aggregate_kind = %A::kind(), count, version, "Saved aggregate");
        if version != tracked.state().version() {
            tracing::warn!(
                %stream_id,
                version,
                aggregate_version = tracked.state().version(),
                "Stream version differs from aggregate version after save"
            );
        }

        if let Some(snapshots) = &self.snapshots {
            if snapshots.policy.crosses_boundary(expected, version) {
                Self::refresh_snapshot(snapshots, tracked.state()).await;
            }
        }
        Ok(version)
    }

    /// Rebuild an aggregate. Returns `None` if its stream is empty.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<A>, RepositoryError> {
        if let Some(snapshots) = &self.snapshots {
            match self.load_from_snapshot(snapshots, id).await {
                Ok(Some(state)) => return Ok(Some(state)),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        stream_id = %id,
                        aggregate_kind = %A::kind(),
                        %error,
                        "Snapshot load failed, falling back to full replay"
                    );
                }
            }
        }
        self.replay(id).await
    }

    /// [`find_by_id`](Self::find_by_id), with an empty stream reported as
    /// [`RepositoryError::NotFound`].
    pub async fn load(&self, id: Uuid) -> Result<Tracked<A>, RepositoryError> {
        self.find_by_id(id)
            .await?
            .map(Tracked::loaded)
            .ok_or(RepositoryError::NotFound {
                kind: A::kind(),
                id,
            })
    }

    /// Write a snapshot of `state` now, regardless of the policy. Unlike
    /// the automatic refresh, failures are returned.
    pub async fn write_snapshot(&self, state: &A) -> Result<Option<Snapshot>, RepositoryError> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(None);
        };
        let snapshot = snapshot_of(state).map_err(DbError::from)?;
        snapshots
            .store
            .save_snapshot(&snapshot)
            .await
            .map_err(RepositoryError::StoreUnavailable)?;
        Ok(Some(snapshot))
    }

    async fn refresh_snapshot(snapshots: &Snapshots, state: &A) {
        let snapshot = match snapshot_of(state) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(stream_id = %state.stream_id(), %error, "Could not serialize snapshot");
                return;
            }
        };
        match snapshots.store.save_snapshot(&snapshot).await {
            Ok(()) => tracing::debug!(
                stream_id = %snapshot.aggregate_id,
                aggregate_kind = %snapshot.aggregate_kind,
                version = snapshot.version,
                "Snapshot refreshed"
            ),
            Err(error) => tracing::warn!(
                stream_id = %snapshot.aggregate_id,
                %error,
                "Snapshot save failed"
            ),
        }
    }

    /// Latest snapshot plus the events after it. `Ok(None)` means the
    /// caller should replay the whole stream.
    async fn load_from_snapshot(
        &self,
        snapshots: &Snapshots,
        id: Uuid,
    ) -> Result<Option<A>, RepositoryError> {
        let Some(snapshot) = snapshots
            .store
            .get_snapshot(id, A::kind())
            .await
            .map_err(RepositoryError::StoreUnavailable)?
        else {
            return Ok(None);
        };

        let subsequent = self.events.get_events(id, Some(snapshot.version)).await?;
        if subsequent.is_empty() {
            // Nothing after the snapshot: the full replay path is taken.
            tracing::debug!(
                stream_id = %id,
                version = snapshot.version,
                "No events after snapshot, replaying full stream"
            );
            return Ok(None);
        }

        let first = snapshot.version.checked_add(1);
        let history = decode_stream::<A>(id, &subsequent, first)?;
        let state = from_snapshot::<A>(&snapshot, &history)?;
        tracing::debug!(
            stream_id = %id,
            snapshot_version = snapshot.version,
            version = state.version(),
            "Loaded from snapshot"
        );
        Ok(Some(state))
    }

    async fn replay(&self, id: Uuid) -> Result<Option<A>, RepositoryError> {
        let events = self.events.get_events(id, None).await?;
        if events.is_empty() {
            return Ok(None);
        }
        let history = decode_stream::<A>(id, &events, Some(1))?;
        let state = from_history::<A>(id, &history)?;
        tracing::debug!(stream_id = %id, version = state.version(), "Replayed full stream");
        Ok(Some(state))
    }
}

/// Decode a run of stored events, checking they belong to `stream_id` and
/// carry contiguous versions starting at `first_version`.
fn decode_stream<A: Aggregate>(
    stream_id: Uuid,
    events: &[StoredEvent],
    first_version: Option<u64>,
) -> Result<Vec<Decoded<A::Event>>, RepositoryError> {
    let corrupt = |reason: String| RepositoryError::CorruptStream { stream_id, reason };
    let mut expected = first_version.ok_or_else(|| corrupt("version overflow".to_owned()))?;
    let mut history = Vec::with_capacity(events.len());
    for event in events {
        if event.stream_id != stream_id {
            return Err(corrupt(format!("event {} belongs to {}", event.event_id, event.stream_id)));
        }
        if event.stream_version != expected {
            return Err(corrupt(format!(
                "expected version {expected}, found {}",
                event.stream_version
            )));
        }
        history.push(decode::<A::Event>(event)?);
        expected = expected
            .checked_add(1)
            .ok_or_else(|| corrupt("version overflow".to_owned()))?;
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_fires_on_crossing_a_multiple() {
        let policy = SnapshotPolicy::every(10);
        assert!(!policy.crosses_boundary(0, 9));
        assert!(policy.crosses_boundary(9, 10));
        assert!(policy.crosses_boundary(8, 23));
        assert!(!policy.crosses_boundary(10, 19));
        assert!(!SnapshotPolicy::every(0).crosses_boundary(0, 100));
    }

    #[test]
    fn db_conflicts_keep_their_kind() {
        let stream_id = Uuid::now_v7();
        let error = RepositoryError::from(DbError::ConcurrencyConflict {
            stream_id,
            expected: 1,
            actual: 2,
        });
        assert_eq!(error.kind(), RepositoryErrorKind::ConcurrencyConflict);

        let error = RepositoryError::from(DbError::Config("down".to_owned()));
        assert_eq!(error.kind(), RepositoryErrorKind::StoreUnavailable);
    }
}
