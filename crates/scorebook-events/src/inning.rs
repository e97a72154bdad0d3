//! Events of the inning/half-inning aggregate.

use scorebook_types::{
    AdvanceReason, AggregateKind, AtBatResultType, Base, GameId, Half, InningStateId, PlayerId,
    TeamSide,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::EventPayload;
use crate::event_type::EventType;

/// Facts recorded on an inning state stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum InningStateEvent {
    /// Inning tracking started for a game.
    InningStateCreated {
        /// The new inning state.
        inning_state_id: InningStateId,
        /// The game it tracks.
        game_id: GameId,
        /// Number of slots each side's batting pointer cycles through.
        batting_order_size: u8,
    },
    /// A plate appearance finished.
    AtBatCompleted {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// The batter.
        batter_id: PlayerId,
        /// The batter's slot.
        batting_slot: u8,
        /// Outcome of the plate appearance.
        result: AtBatResultType,
        /// Inning of the plate appearance.
        inning: u32,
        /// Half of the plate appearance.
        half: Half,
        /// Whether the batter was put out.
        batter_out: bool,
    },
    /// A runner (or the batter, when `from` is `None`) reached a base.
    RunnerAdvanced {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// The runner.
        runner_id: PlayerId,
        /// Base the runner left; `None` for the batter.
        from: Option<Base>,
        /// Base the runner reached.
        to: Base,
        /// Why the runner moved.
        reason: AdvanceReason,
    },
    /// A runner was put out and removed from the bases.
    RunnerOut {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// The runner.
        runner_id: PlayerId,
        /// Base the runner was on; `None` for the batter-runner.
        from: Option<Base>,
    },
    /// A runner crossed the plate.
    RunScored {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// The runner who scored.
        runner_id: PlayerId,
        /// Base the runner scored from; `None` for the batter.
        from: Option<Base>,
        /// Side credited with the run.
        batting_side: TeamSide,
        /// Inning in which the run scored.
        inning: u32,
    },
    /// A half-inning ended.
    HalfInningEnded {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// Inning of the half that ended.
        inning: u32,
        /// The half that ended.
        half: Half,
        /// Outs recorded when it ended.
        outs: u8,
    },
    /// The inning number increased after a bottom half ended.
    InningAdvanced {
        /// The inning state.
        inning_state_id: InningStateId,
        /// The game.
        game_id: GameId,
        /// Inning that just finished.
        previous_inning: u32,
        /// Inning now being played.
        new_inning: u32,
    },
}

impl InningStateEvent {
    /// The inning state this event belongs to.
    pub const fn inning_state_id(&self) -> InningStateId {
        match self {
            Self::InningStateCreated { inning_state_id, .. }
            | Self::AtBatCompleted { inning_state_id, .. }
            | Self::RunnerAdvanced { inning_state_id, .. }
            | Self::RunnerOut { inning_state_id, .. }
            | Self::RunScored { inning_state_id, .. }
            | Self::HalfInningEnded { inning_state_id, .. }
            | Self::InningAdvanced { inning_state_id, .. } => *inning_state_id,
        }
    }
}

impl EventPayload for InningStateEvent {
    const KIND: AggregateKind = AggregateKind::InningState;

    fn event_type(&self) -> EventType {
        match self {
            Self::InningStateCreated { .. } => EventType::InningStateCreated,
            Self::AtBatCompleted { .. } => EventType::AtBatCompleted,
            Self::RunnerAdvanced { .. } => EventType::RunnerAdvanced,
            Self::RunnerOut { .. } => EventType::RunnerOut,
            Self::RunScored { .. } => EventType::RunScored,
            Self::HalfInningEnded { .. } => EventType::HalfInningEnded,
            Self::InningAdvanced { .. } => EventType::InningAdvanced,
        }
    }

    fn stream_id(&self) -> Uuid {
        self.inning_state_id().into_inner()
    }

    fn game_id(&self) -> GameId {
        match self {
            Self::InningStateCreated { game_id, .. }
            | Self::AtBatCompleted { game_id, .. }
            | Self::RunnerAdvanced { game_id, .. }
            | Self::RunnerOut { game_id, .. }
            | Self::RunScored { game_id, .. }
            | Self::HalfInningEnded { game_id, .. }
            | Self::InningAdvanced { game_id, .. } => *game_id,
        }
    }
}
