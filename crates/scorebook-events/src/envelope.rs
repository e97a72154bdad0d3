//! Event envelopes: the in-memory [`DomainEvent`], the persisted
//! [`StoredEvent`], and the [`Snapshot`] cache record.

use chrono::{DateTime, Utc};
use scorebook_types::{AggregateKind, EventId, GameId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::CURRENT_SCHEMA_VERSION;
use crate::event_type::EventType;

/// A closed set of event variants belonging to one aggregate kind.
///
/// Implemented by [`GameEvent`](crate::GameEvent),
/// [`TeamLineupEvent`](crate::TeamLineupEvent), and
/// [`InningStateEvent`](crate::InningStateEvent).
pub trait EventPayload:
    Serialize + DeserializeOwned + Clone + PartialEq + core::fmt::Debug + Send + Sync + 'static
{
    /// The aggregate kind whose stream carries these events.
    const KIND: AggregateKind;

    /// The discriminant of this variant.
    fn event_type(&self) -> EventType;

    /// Identity of the stream (aggregate instance) this event belongs to.
    fn stream_id(&self) -> Uuid;

    /// The game every stream of a match is grouped under.
    fn game_id(&self) -> GameId;

    /// Whether this is the aggregate's creation event.
    fn is_creation(&self) -> bool {
        self.event_type().is_creation()
    }
}

/// An immutable fact about one aggregate, as produced by the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent<P> {
    /// Unique event identifier.
    pub event_id: EventId,
    /// When the event was produced.
    pub occurred_at: DateTime<Utc>,
    /// Payload schema version this event was written with.
    pub schema_version: u32,
    /// Event-specific payload.
    pub payload: P,
}

impl<P: EventPayload> DomainEvent<P> {
    /// Wrap a payload in a fresh envelope stamped with the current time and
    /// the current schema version.
    pub fn new(payload: P) -> Self {
        Self::at(payload, Utc::now())
    }

    /// Wrap a payload with an explicit timestamp.
    pub fn at(payload: P, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at,
            schema_version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }

    /// The discriminant of the payload.
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

/// Storage metadata attached to every persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Which component wrote the event (e.g. `"scorebook-db"`, a device id).
    pub source: String,
    /// When the envelope was built for persistence.
    pub created_at: DateTime<Utc>,
    /// Groups events produced by one logical request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    /// The event or command that caused this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<Uuid>,
}

impl EventMetadata {
    /// Metadata for events written by `source`, stamped now.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            created_at: Utc::now(),
            correlation_id: None,
            causation_id: None,
        }
    }

    /// Attach a correlation id.
    #[must_use]
    pub const fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Attach a causation id.
    #[must_use]
    pub const fn with_causation_id(mut self, id: Uuid) -> Self {
        self.causation_id = Some(id);
        self
    }
}

/// An encoded event waiting to be appended. The store assigns the stream
/// version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Event type name.
    pub event_type: String,
    /// The game this event's stream belongs to.
    pub group_id: Uuid,
    /// Serialized payload.
    pub payload: serde_json::Value,
    /// Payload schema version.
    pub schema_version: u32,
    /// When the event was produced.
    pub occurred_at: DateTime<Utc>,
    /// Storage metadata.
    pub metadata: EventMetadata,
}

/// A persisted event, as returned by the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Identity of the owning aggregate instance.
    pub stream_id: Uuid,
    /// Kind of the owning aggregate.
    pub aggregate_kind: AggregateKind,
    /// The game this stream belongs to.
    pub group_id: Uuid,
    /// Event type name. May name a type this build does not know.
    pub event_type: String,
    /// Serialized payload.
    pub payload: serde_json::Value,
    /// Payload schema version.
    pub schema_version: u32,
    /// Position in the stream, 1-based and contiguous.
    pub stream_version: u64,
    /// When the event was produced.
    pub occurred_at: DateTime<Utc>,
    /// Storage metadata.
    pub metadata: EventMetadata,
}

impl StoredEvent {
    /// Build the persisted form of `event` at `stream_version`.
    pub fn from_uncommitted(
        event: UncommittedEvent,
        stream_id: Uuid,
        aggregate_kind: AggregateKind,
        stream_version: u64,
    ) -> Self {
        Self {
            event_id: event.event_id,
            stream_id,
            aggregate_kind,
            group_id: event.group_id,
            event_type: event.event_type,
            payload: event.payload,
            schema_version: event.schema_version,
            stream_version,
            occurred_at: event.occurred_at,
            metadata: event.metadata,
        }
    }
}

/// A point-in-time copy of an aggregate's state.
///
/// Snapshots are a cache: discarding one never loses information, since the
/// same state can be rebuilt from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identity of the aggregate instance.
    pub aggregate_id: Uuid,
    /// Kind of the aggregate.
    pub aggregate_kind: AggregateKind,
    /// Stream version the state reflects.
    pub version: u64,
    /// Serialized aggregate state.
    pub state: serde_json::Value,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}
