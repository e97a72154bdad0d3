//! The versioned-schema boundary between domain events and stored
//! envelopes.
//!
//! All schema evolution lives here:
//!
//! - [`encode`] stamps the current schema version and serializes the payload.
//! - [`decode`] upcasts payloads written at older schema versions, ignores
//!   unknown fields written by newer builds, and reports event types this
//!   build does not know as [`Decoded::Unknown`] so replay can skip them.
//!
//! # Schema history
//!
//! | Version | Change |
//! |---------|--------|
//! | 1 | Initial payloads |
//! | 2 | `PlayerSubstitutedIntoGame.is_reentry`, `InningStateCreated.batting_order_size` |

use scorebook_types::AggregateKind;
use serde_json::{Map, Value};

use crate::envelope::{DomainEvent, EventMetadata, EventPayload, StoredEvent, UncommittedEvent};
use crate::event_type::EventType;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Batting order size assumed for inning states created before the size
/// was recorded.
pub const LEGACY_BATTING_ORDER_SIZE: u8 = 9;

/// Name of the discriminant field inside every serialized payload.
const TAG_FIELD: &str = "eventType";

/// Errors raised at the schema boundary.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload could not be serialized or deserialized.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored event was routed to the wrong aggregate kind.
    #[error("stored event belongs to {actual} stream, expected {expected}")]
    KindMismatch {
        /// The kind the caller is decoding for.
        expected: AggregateKind,
        /// The kind recorded on the envelope.
        actual: AggregateKind,
    },

    /// The payload is not a JSON object.
    #[error("malformed {event_type} payload: {reason}")]
    MalformedPayload {
        /// The event type being decoded.
        event_type: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result of decoding one stored event.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<P> {
    /// A known event, ready to be applied.
    Known(DomainEvent<P>),
    /// An event type this build does not know. Replay skips it.
    Unknown {
        /// The stored type name.
        event_type: String,
    },
}

/// Serialize a domain event for appending.
pub fn encode<P: EventPayload>(
    event: &DomainEvent<P>,
    metadata: &EventMetadata,
) -> Result<UncommittedEvent, CodecError> {
    Ok(UncommittedEvent {
        event_id: event.event_id,
        event_type: event.event_type().as_str().to_owned(),
        group_id: event.payload.game_id().into_inner(),
        payload: serde_json::to_value(&event.payload)?,
        schema_version: CURRENT_SCHEMA_VERSION,
        occurred_at: event.occurred_at,
        metadata: metadata.clone(),
    })
}

/// Deserialize a stored event into a domain event of kind `P`.
///
/// Unknown event types (and types belonging to another aggregate kind) are
/// returned as [`Decoded::Unknown`] rather than as errors.
pub fn decode<P: EventPayload>(stored: &StoredEvent) -> Result<Decoded<P>, CodecError> {
    if stored.aggregate_kind != P::KIND {
        return Err(CodecError::KindMismatch {
            expected: P::KIND,
            actual: stored.aggregate_kind,
        });
    }

    let Some(event_type) =
        EventType::parse(&stored.event_type).filter(|ty| ty.aggregate_kind() == P::KIND)
    else {
        return Ok(Decoded::Unknown {
            event_type: stored.event_type.clone(),
        });
    };

    let payload = upcast(event_type, stored.schema_version, stored.payload.clone())?;
    let payload: P = serde_json::from_value(payload)?;

    Ok(Decoded::Known(DomainEvent {
        event_id: stored.event_id,
        occurred_at: stored.occurred_at,
        schema_version: stored.schema_version,
        payload,
    }))
}

/// Bring a stored payload up to the current schema.
fn upcast(event_type: EventType, schema_version: u32, payload: Value) -> Result<Value, CodecError> {
    let Value::Object(mut fields) = payload else {
        return Err(CodecError::MalformedPayload {
            event_type: event_type.as_str().to_owned(),
            reason: "expected a JSON object".to_owned(),
        });
    };

    fields
        .entry(TAG_FIELD)
        .or_insert_with(|| Value::String(event_type.as_str().to_owned()));

    if schema_version < 2 {
        upcast_v1_to_v2(event_type, &mut fields);
    }

    Ok(Value::Object(fields))
}

fn upcast_v1_to_v2(event_type: EventType, fields: &mut Map<String, Value>) {
    match event_type {
        EventType::PlayerSubstitutedIntoGame => {
            fields
                .entry("is_reentry")
                .or_insert(Value::Bool(false));
        }
        EventType::InningStateCreated => {
            fields
                .entry("batting_order_size")
                .or_insert_with(|| Value::from(LEGACY_BATTING_ORDER_SIZE));
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use chrono::Utc;
    use scorebook_types::{GameId, InningStateId, TeamLineupId};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::{InningStateEvent, TeamLineupEvent};

    fn stored(kind: AggregateKind, event_type: &str, schema_version: u32, payload: Value) -> StoredEvent {
        StoredEvent {
            event_id: scorebook_types::EventId::new(),
            stream_id: Uuid::now_v7(),
            aggregate_kind: kind,
            group_id: Uuid::now_v7(),
            event_type: event_type.to_owned(),
            payload,
            schema_version,
            stream_version: 1,
            occurred_at: Utc::now(),
            metadata: EventMetadata::new("test"),
        }
    }

    #[test]
    fn encoded_event_decodes_to_the_same_payload() {
        let event = DomainEvent::new(InningStateEvent::InningStateCreated {
            inning_state_id: InningStateId::new(),
            game_id: GameId::new(),
            batting_order_size: 11,
        });
        let uncommitted = encode(&event, &EventMetadata::new("test")).unwrap();
        assert_eq!(uncommitted.event_type, "InningStateCreated");
        assert_eq!(uncommitted.group_id, event.payload.game_id().into_inner());

        let stored = StoredEvent::from_uncommitted(
            uncommitted,
            event.payload.stream_id(),
            AggregateKind::InningState,
            1,
        );
        let decoded: Decoded<InningStateEvent> = decode(&stored).unwrap();
        assert_eq!(decoded, Decoded::Known(event));
    }

    #[test]
    fn unknown_event_type_is_skipped_not_rejected() {
        let event = stored(
            AggregateKind::InningState,
            "PitchThrown",
            CURRENT_SCHEMA_VERSION,
            json!({ "velocity": 61 }),
        );
        let decoded: Decoded<InningStateEvent> = decode(&event).unwrap();
        assert_eq!(
            decoded,
            Decoded::Unknown {
                event_type: "PitchThrown".to_owned()
            }
        );
    }

    #[test]
    fn event_of_another_kind_is_treated_as_unknown() {
        let event = stored(
            AggregateKind::InningState,
            "GameStarted",
            CURRENT_SCHEMA_VERSION,
            json!({}),
        );
        let decoded: Decoded<InningStateEvent> = decode(&event).unwrap();
        assert!(matches!(decoded, Decoded::Unknown { .. }));
    }

    #[test]
    fn envelope_kind_mismatch_is_an_error() {
        let event = stored(AggregateKind::Game, "GameStarted", 2, json!({}));
        let result: Result<Decoded<InningStateEvent>, _> = decode(&event);
        assert!(matches!(result, Err(CodecError::KindMismatch { .. })));
    }

    #[test]
    fn v1_substitution_defaults_reentry_to_false() {
        let lineup_id = TeamLineupId::new();
        let game_id = GameId::new();
        let event = stored(
            AggregateKind::TeamLineup,
            "PlayerSubstitutedIntoGame",
            1,
            json!({
                "lineup_id": lineup_id,
                "game_id": game_id,
                "batting_slot": 3,
                "outgoing_player_id": Uuid::now_v7(),
                "incoming_player_id": Uuid::now_v7(),
                "jersey_number": "12",
                "name": "Sam",
                "position": "LEFT_FIELD",
                "inning": 4,
            }),
        );
        let Decoded::Known(decoded) = decode::<TeamLineupEvent>(&event).unwrap() else {
            panic!("expected a known event");
        };
        assert!(matches!(
            decoded.payload,
            TeamLineupEvent::PlayerSubstitutedIntoGame {
                is_reentry: false,
                batting_slot: 3,
                ..
            }
        ));
    }

    #[test]
    fn v1_inning_state_gets_legacy_order_size() {
        let event = stored(
            AggregateKind::InningState,
            "InningStateCreated",
            1,
            json!({ "inning_state_id": Uuid::now_v7(), "game_id": Uuid::now_v7() }),
        );
        let Decoded::Known(decoded) = decode::<InningStateEvent>(&event).unwrap() else {
            panic!("expected a known event");
        };
        assert!(matches!(
            decoded.payload,
            InningStateEvent::InningStateCreated {
                batting_order_size: LEGACY_BATTING_ORDER_SIZE,
                ..
            }
        ));
    }

    #[test]
    fn newer_payload_fields_are_ignored() {
        let event = stored(
            AggregateKind::InningState,
            "InningAdvanced",
            CURRENT_SCHEMA_VERSION + 1,
            json!({
                "inning_state_id": Uuid::now_v7(),
                "game_id": Uuid::now_v7(),
                "previous_inning": 1,
                "new_inning": 2,
                "weather": "rain delay",
            }),
        );
        let decoded = decode::<InningStateEvent>(&event).unwrap();
        assert!(matches!(decoded, Decoded::Known(_)));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let event = stored(AggregateKind::InningState, "RunScored", 2, json!([1, 2]));
        let result = decode::<InningStateEvent>(&event);
        assert!(matches!(result, Err(CodecError::MalformedPayload { .. })));
    }
}
