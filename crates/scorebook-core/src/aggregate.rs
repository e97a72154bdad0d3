//! The event-sourcing contract shared by every aggregate.
//!
//! Mutations are pure: they read the current state and return an
//! [`Outcome`] holding the next state and the events that produced it. The
//! next state is always computed by folding those events through
//! [`Aggregate::apply`], so what a mutation returns and what a later replay
//! rebuilds can never drift apart.
//!
//! [`Tracked`] collects the outcomes of several mutations until the
//! repository persists them. Replay lives in [`from_events`],
//! [`from_history`], and [`from_snapshot`].

use chrono::Utc;
use scorebook_events::{Decoded, DomainEvent, EventPayload, Snapshot};
use scorebook_types::AggregateKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{DomainError, ReplayError};

/// An event-sourced consistency boundary.
pub trait Aggregate:
    Clone + PartialEq + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The closed set of events this aggregate produces and consumes.
    type Event: EventPayload;

    /// Identity of this instance's stream.
    fn stream_id(&self) -> Uuid;

    /// Number of events applied to reach this state.
    fn version(&self) -> u64;

    /// Overwrite the version counter. Only the fold calls this.
    fn set_version(&mut self, version: u64);

    /// Build the initial state from a creation event. Returns `None` when
    /// `event` is not this aggregate's creation event.
    fn create(event: &Self::Event) -> Option<Self>;

    /// Apply a non-creation event. Events are facts: applying one never
    /// fails, and event types without an effect leave the state as is.
    #[must_use]
    fn apply(self, event: &Self::Event) -> Self;

    /// The kind of stream this aggregate owns.
    fn kind() -> AggregateKind {
        <Self::Event as EventPayload>::KIND
    }
}

/// The result of a successful mutation: the next state plus the events
/// that produced it, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<A: Aggregate> {
    /// State after all `events` were applied.
    pub state: A,
    /// Newly emitted events.
    pub events: Vec<DomainEvent<A::Event>>,
}

impl<A: Aggregate> Outcome<A> {
    /// Split into state and events.
    pub fn into_parts(self) -> (A, Vec<DomainEvent<A::Event>>) {
        (self.state, self.events)
    }
}

/// Start a new aggregate from its creation payload.
pub(crate) fn create<A: Aggregate>(payload: A::Event) -> Result<Outcome<A>, DomainError> {
    let mut state = A::create(&payload).ok_or_else(|| {
        DomainError::InvalidArgument(format!("{} is not a creation event", payload.event_type()))
    })?;
    state.set_version(1);
    Ok(Outcome {
        state,
        events: vec![DomainEvent::at(payload, Utc::now())],
    })
}

/// Fold freshly decided payloads onto a copy of `current`.
pub(crate) fn emit<A: Aggregate>(
    current: &A,
    payloads: Vec<A::Event>,
) -> Result<Outcome<A>, DomainError> {
    let occurred_at = Utc::now();
    let mut state = current.clone();
    let mut events = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let version = state
            .version()
            .checked_add(1)
            .ok_or(DomainError::Overflow("aggregate version"))?;
        state = state.apply(&payload);
        state.set_version(version);
        events.push(DomainEvent::at(payload, occurred_at));
    }
    Ok(Outcome { state, events })
}

/// An aggregate together with the events it has emitted since it was last
/// persisted.
///
/// The aggregate states themselves never carry pending events; this holder
/// is the only place they accumulate.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<A: Aggregate> {
    state: A,
    pending: Vec<DomainEvent<A::Event>>,
}

impl<A: Aggregate> Tracked<A> {
    /// Wrap a state loaded from the store (no pending events).
    pub const fn loaded(state: A) -> Self {
        Self {
            state,
            pending: Vec::new(),
        }
    }

    /// Wrap the outcome of a creation or mutation; its events are pending.
    pub fn from_outcome(outcome: Outcome<A>) -> Self {
        let (state, pending) = outcome.into_parts();
        Self { state, pending }
    }

    /// Run a mutation against the current state. On success the state is
    /// replaced and the emitted events are queued; on failure nothing
    /// changes.
    pub fn execute<F>(&mut self, mutation: F) -> Result<&A, DomainError>
    where
        F: FnOnce(&A) -> Result<Outcome<A>, DomainError>,
    {
        let (state, events) = mutation(&self.state)?.into_parts();
        self.state = state;
        self.pending.extend(events);
        Ok(&self.state)
    }

    /// The current state.
    pub const fn state(&self) -> &A {
        &self.state
    }

    /// Events not yet persisted, oldest first.
    pub fn pending(&self) -> &[DomainEvent<A::Event>] {
        &self.pending
    }

    /// Stream version the store must currently be at for the pending
    /// events to append cleanly.
    pub fn expected_version(&self) -> u64 {
        let pending = u64::try_from(self.pending.len()).unwrap_or(u64::MAX);
        self.state.version().saturating_sub(pending)
    }

    /// Drop the pending events after they were persisted.
    pub fn mark_committed(&mut self) {
        self.pending.clear();
    }

    /// Give up tracking and return the state.
    pub fn into_state(self) -> A {
        self.state
    }
}

/// Rebuild an aggregate from its complete history.
///
/// The first event must be the creation event of `stream_id`; every other
/// event must belong to the same stream and must not be a creation event.
pub fn from_events<A: Aggregate>(
    stream_id: Uuid,
    events: &[DomainEvent<A::Event>],
) -> Result<A, ReplayError> {
    fold(stream_id, None, events.iter().map(|event| Some(&event.payload)))
}

/// Rebuild an aggregate from decoded stored events, skipping event types
/// this build does not know. Skipped events still count toward the
/// version so it keeps matching the stream length.
pub fn from_history<A: Aggregate>(
    stream_id: Uuid,
    history: &[Decoded<A::Event>],
) -> Result<A, ReplayError> {
    fold(stream_id, None, history.iter().map(known_payload))
}

/// Rebuild an aggregate from a snapshot and the events recorded after it.
///
/// Produces the same state as [`from_events`] over the complete history.
pub fn from_snapshot<A: Aggregate>(
    snapshot: &Snapshot,
    subsequent: &[Decoded<A::Event>],
) -> Result<A, ReplayError> {
    let base = restore::<A>(snapshot)?;
    fold(
        snapshot.aggregate_id,
        Some(base),
        subsequent.iter().map(known_payload),
    )
}

/// Serialize the current state into a snapshot.
pub fn snapshot_of<A: Aggregate>(state: &A) -> Result<Snapshot, serde_json::Error> {
    Ok(Snapshot {
        aggregate_id: state.stream_id(),
        aggregate_kind: A::kind(),
        version: state.version(),
        state: serde_json::to_value(state)?,
        taken_at: Utc::now(),
    })
}

fn restore<A: Aggregate>(snapshot: &Snapshot) -> Result<A, ReplayError> {
    let invalid = |reason: String| ReplayError::InvalidSnapshot {
        kind: A::kind(),
        stream_id: snapshot.aggregate_id,
        reason,
    };

    if snapshot.aggregate_kind != A::kind() {
        return Err(invalid(format!(
            "snapshot is of kind {}",
            snapshot.aggregate_kind
        )));
    }

    let mut state: A =
        serde_json::from_value(snapshot.state.clone()).map_err(|e| invalid(e.to_string()))?;

    if state.stream_id() != snapshot.aggregate_id {
        return Err(invalid(format!("state belongs to {}", state.stream_id())));
    }
    if snapshot.version == 0 {
        return Err(invalid("snapshot version is zero".to_owned()));
    }

    state.set_version(snapshot.version);
    Ok(state)
}

const fn known_payload<E>(decoded: &Decoded<E>) -> Option<&E> {
    match decoded {
        Decoded::Known(event) => Some(&event.payload),
        Decoded::Unknown { .. } => None,
    }
}

/// Fold a history onto an optional base state. `None` items are unknown
/// events: they advance the version without touching state.
fn fold<'a, A, I>(stream_id: Uuid, base: Option<A>, history: I) -> Result<A, ReplayError>
where
    A: Aggregate,
    I: IntoIterator<Item = Option<&'a A::Event>>,
{
    let kind = A::kind();
    let mut state = base;

    for item in history {
        if let Some(event) = item {
            if event.stream_id() != stream_id {
                return Err(ReplayError::IdentityMismatch {
                    kind,
                    expected: stream_id,
                    found: event.stream_id(),
                });
            }
        }

        state = Some(match (state, item) {
            (None, Some(event)) => {
                let mut created =
                    A::create(event).ok_or_else(|| ReplayError::MissingCreation {
                        kind,
                        stream_id,
                        event_type: event.event_type().as_str().to_owned(),
                    })?;
                created.set_version(1);
                created
            }
            (None, None) => {
                return Err(ReplayError::MissingCreation {
                    kind,
                    stream_id,
                    event_type: "unknown".to_owned(),
                });
            }
            (Some(current), Some(event)) => {
                if event.is_creation() {
                    return Err(ReplayError::DuplicateCreation { kind, stream_id });
                }
                bump(current.apply(event), stream_id)?
            }
            (Some(current), None) => bump(current, stream_id)?,
        });
    }

    state.ok_or(ReplayError::EmptyHistory { kind, stream_id })
}

fn bump<A: Aggregate>(mut state: A, stream_id: Uuid) -> Result<A, ReplayError> {
    let version = state
        .version()
        .checked_add(1)
        .ok_or(ReplayError::VersionOverflow(stream_id))?;
    state.set_version(version);
    Ok(state)
}
