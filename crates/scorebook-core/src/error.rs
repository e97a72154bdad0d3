//! Error types for the aggregate state machines.
//!
//! [`DomainError`] is raised synchronously by a mutation that would break
//! an invariant; the aggregate it was called on is left untouched.
//! [`ReplayError`] is raised while rebuilding an aggregate from its stream
//! and is fatal for that load.

use scorebook_types::{AggregateKind, Base, FieldPosition, PlayerId};
use uuid::Uuid;

/// A mutation was rejected because it would violate an invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Batting slot outside 1-20.
    #[error("batting slot {slot} is outside 1-{max}")]
    SlotOutOfRange {
        /// The rejected slot.
        slot: u8,
        /// Highest allowed slot.
        max: u8,
    },

    /// The batter is not in the slot that is due up.
    #[error("batting slot {actual} is not due up (expected slot {expected})")]
    BattingOutOfOrder {
        /// Slot due up.
        expected: u8,
        /// Slot supplied by the caller.
        actual: u8,
    },

    /// The at-bat was recorded against the wrong inning.
    #[error("inning {actual} does not match the current inning {expected}")]
    InningMismatch {
        /// Current inning.
        expected: u32,
        /// Inning supplied by the caller.
        actual: u32,
    },

    /// A runner movement does not match the bases.
    #[error("invalid runner movement: {reason}")]
    InvalidRunnerMovement {
        /// What is wrong with the movement.
        reason: String,
    },

    /// The base a runner should leave is not occupied by that runner.
    #[error("runner {runner} is not on {base:?}")]
    RunnerNotOnBase {
        /// The runner named in the movement.
        runner: PlayerId,
        /// The base named in the movement.
        base: Base,
    },

    /// The play is impossible in the current situation.
    #[error("invalid play: {reason}")]
    InvalidPlay {
        /// Why the play cannot happen.
        reason: String,
    },

    /// The batting slot is already occupied.
    #[error("batting slot {0} is already occupied")]
    SlotOccupied(u8),

    /// The player does not occupy the named slot.
    #[error("player {player} does not occupy batting slot {slot}")]
    NotInSlot {
        /// The player named by the caller.
        player: PlayerId,
        /// The slot named by the caller.
        slot: u8,
    },

    /// Another active player already wears this jersey.
    #[error("jersey number {0} is already in use")]
    DuplicateJersey(String),

    /// The player is already on the roster.
    #[error("player {0} is already in the lineup")]
    PlayerAlreadyRostered(PlayerId),

    /// The player is not on the roster (or not active).
    #[error("player {0} is not in the lineup")]
    PlayerNotRostered(PlayerId),

    /// Another active player already holds this position.
    #[error("position {0:?} is already assigned")]
    PositionTaken(FieldPosition),

    /// The player already plays this position.
    #[error("player {player} already plays {position:?}")]
    SamePosition {
        /// The player.
        player: PlayerId,
        /// The unchanged position.
        position: FieldPosition,
    },

    /// Re-entry requested for a player who may not re-enter.
    #[error("player {player} is not eligible to re-enter: {reason}")]
    ReentryNotAllowed {
        /// The player attempting to re-enter.
        player: PlayerId,
        /// Why re-entry is refused.
        reason: &'static str,
    },

    /// The game is not in a status that allows this operation.
    #[error("game is {actual}, operation requires {required}")]
    InvalidGameStatus {
        /// Status required by the operation.
        required: &'static str,
        /// Current status.
        actual: &'static str,
    },

    /// Any other argument rejected by the aggregate.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A counter overflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}

/// Rebuilding an aggregate from its history failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// The history has no events at all.
    #[error("cannot rebuild {kind} {stream_id} from an empty history")]
    EmptyHistory {
        /// Kind being rebuilt.
        kind: AggregateKind,
        /// Stream being rebuilt.
        stream_id: Uuid,
    },

    /// The first event is not the aggregate's creation event.
    #[error("first event of {kind} {stream_id} is {event_type}, not its creation event")]
    MissingCreation {
        /// Kind being rebuilt.
        kind: AggregateKind,
        /// Stream being rebuilt.
        stream_id: Uuid,
        /// Type of the first event.
        event_type: String,
    },

    /// A second creation event appeared in the stream.
    #[error("duplicate creation event in {kind} {stream_id}")]
    DuplicateCreation {
        /// Kind being rebuilt.
        kind: AggregateKind,
        /// Stream being rebuilt.
        stream_id: Uuid,
    },

    /// An event belongs to a different aggregate instance.
    #[error("event for stream {found} found while rebuilding {kind} {expected}")]
    IdentityMismatch {
        /// Kind being rebuilt.
        kind: AggregateKind,
        /// Stream being rebuilt.
        expected: Uuid,
        /// Stream named by the event.
        found: Uuid,
    },

    /// A snapshot's payload could not be turned back into state.
    #[error("snapshot of {kind} {stream_id} is unusable: {reason}")]
    InvalidSnapshot {
        /// Kind being rebuilt.
        kind: AggregateKind,
        /// Stream being rebuilt.
        stream_id: Uuid,
        /// What is wrong with it.
        reason: String,
    },

    /// The version counter overflowed.
    #[error("version overflow while rebuilding {0}")]
    VersionOverflow(Uuid),
}
