//! Event sourcing vocabulary for the Scorebook live game tracker.
//!
//! Every state change produces an immutable event appended to the owning
//! aggregate's stream. Events are the source of truth: state is rebuilt by
//! replaying them. This crate defines the event payloads of each aggregate
//! kind, the envelopes they are persisted in, and the codec that sits
//! between the two.
//!
//! # Modules
//!
//! - [`event_type`] -- The [`EventType`] discriminant stored with each event
//! - [`envelope`] -- [`DomainEvent`], [`StoredEvent`], [`Snapshot`]
//! - [`game`], [`lineup`], [`inning`] -- Per-aggregate payload enums
//! - [`codec`] -- Encode/decode with schema upcasting and unknown-type skip

pub mod codec;
pub mod envelope;
pub mod event_type;
pub mod game;
pub mod inning;
pub mod lineup;

pub use codec::{CURRENT_SCHEMA_VERSION, CodecError, Decoded, decode, encode};
pub use envelope::{
    DomainEvent, EventMetadata, EventPayload, Snapshot, StoredEvent, UncommittedEvent,
};
pub use event_type::EventType;
pub use game::GameEvent;
pub use inning::InningStateEvent;
pub use lineup::TeamLineupEvent;
