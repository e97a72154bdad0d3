//! Shared type definitions for the Scorebook live game tracker.
//!
//! This crate is the single source of truth for the identifiers and closed
//! vocabularies used across the workspace. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the scoring UI.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for aggregate and player identifiers
//! - [`enums`] -- Aggregate kinds, halves, bases, at-bat results, positions

pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AdvanceReason, AggregateKind, AtBatResultType, Base, FieldPosition, GameStatus, Half,
    RunnerDestination, TeamSide,
};
pub use ids::{EventId, GameId, InningStateId, PlayerId, TeamLineupId};
