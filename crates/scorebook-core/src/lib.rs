//! Event-sourced aggregates for the Scorebook live game tracker.
//!
//! Every mutation here is a pure function of the aggregate it is called
//! on: it validates, then returns an [`Outcome`] with the next state and
//! the events that produced it. Nothing in this crate performs I/O; the
//! `scorebook-db` crate persists events and rebuilds aggregates.
//!
//! # Modules
//!
//! - [`aggregate`] -- The [`Aggregate`] trait, [`Outcome`], [`Tracked`],
//!   and the replay fold ([`from_events`], [`from_history`],
//!   [`from_snapshot`]).
//! - [`bases`] -- Base occupancy.
//! - [`config`] -- Configuration loading from `scorebook-config.yaml`.
//! - [`error`] -- [`DomainError`] and [`ReplayError`].
//! - [`game`] -- Game score and status.
//! - [`inning_state`] -- Innings, halves, outs, batting pointers, runners.
//! - [`lineup`] -- Batting order, positions, substitutions, re-entry.

pub mod aggregate;
pub mod bases;
pub mod config;
pub mod error;
pub mod game;
pub mod inning_state;
pub mod lineup;

pub use aggregate::{Aggregate, Outcome, Tracked, from_events, from_history, from_snapshot, snapshot_of};
pub use bases::BasesState;
pub use config::{ConfigError, ScorebookConfig, SnapshotBackend};
pub use error::{DomainError, ReplayError};
pub use game::{Game, Score};
pub use inning_state::{InningState, RunnerMovement, Situation};
pub use lineup::{BattingSlot, LineupPlayer, SlotOccupancy, TeamLineup};
