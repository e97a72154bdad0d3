//! Events of the team lineup aggregate.

use scorebook_types::{AggregateKind, FieldPosition, GameId, PlayerId, TeamLineupId, TeamSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::EventPayload;
use crate::event_type::EventType;

/// Facts recorded on a team lineup stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum TeamLineupEvent {
    /// A lineup was created for one team of a game.
    TeamLineupCreated {
        /// The new lineup.
        lineup_id: TeamLineupId,
        /// The game it belongs to.
        game_id: GameId,
        /// Team name.
        team_name: String,
        /// Home or visitors.
        side: TeamSide,
    },
    /// A starter was placed in a batting slot.
    PlayerAddedToLineup {
        /// The lineup.
        lineup_id: TeamLineupId,
        /// The game.
        game_id: GameId,
        /// The player.
        player_id: PlayerId,
        /// Jersey number as printed.
        jersey_number: String,
        /// Player name.
        name: String,
        /// Batting slot, 1-20.
        batting_slot: u8,
        /// Defensive assignment.
        position: FieldPosition,
    },
    /// A player replaced the occupant of a batting slot.
    PlayerSubstitutedIntoGame {
        /// The lineup.
        lineup_id: TeamLineupId,
        /// The game.
        game_id: GameId,
        /// Batting slot being changed.
        batting_slot: u8,
        /// Player leaving the game.
        outgoing_player_id: PlayerId,
        /// Player entering the game.
        incoming_player_id: PlayerId,
        /// Incoming player's jersey number.
        jersey_number: String,
        /// Incoming player's name.
        name: String,
        /// Incoming player's defensive assignment.
        position: FieldPosition,
        /// Inning in which the substitution happened.
        inning: u32,
        /// Whether the incoming player is a starter re-entering.
        is_reentry: bool,
    },
    /// A player moved to another defensive position.
    FieldPositionChanged {
        /// The lineup.
        lineup_id: TeamLineupId,
        /// The game.
        game_id: GameId,
        /// The player.
        player_id: PlayerId,
        /// Position before the change.
        previous_position: FieldPosition,
        /// Position after the change.
        new_position: FieldPosition,
        /// Inning in which the change happened.
        inning: u32,
    },
    /// The batting pointer moved forward one slot.
    BatterAdvancedInLineup {
        /// The lineup.
        lineup_id: TeamLineupId,
        /// The game.
        game_id: GameId,
        /// Slot that just batted.
        previous_slot: u8,
        /// Slot now due up.
        new_slot: u8,
        /// Side of the lineup.
        side: TeamSide,
    },
}

impl TeamLineupEvent {
    /// The lineup this event belongs to.
    pub const fn lineup_id(&self) -> TeamLineupId {
        match self {
            Self::TeamLineupCreated { lineup_id, .. }
            | Self::PlayerAddedToLineup { lineup_id, .. }
            | Self::PlayerSubstitutedIntoGame { lineup_id, .. }
            | Self::FieldPositionChanged { lineup_id, .. }
            | Self::BatterAdvancedInLineup { lineup_id, .. } => *lineup_id,
        }
    }
}

impl EventPayload for TeamLineupEvent {
    const KIND: AggregateKind = AggregateKind::TeamLineup;

    fn event_type(&self) -> EventType {
        match self {
            Self::TeamLineupCreated { .. } => EventType::TeamLineupCreated,
            Self::PlayerAddedToLineup { .. } => EventType::PlayerAddedToLineup,
            Self::PlayerSubstitutedIntoGame { .. } => EventType::PlayerSubstitutedIntoGame,
            Self::FieldPositionChanged { .. } => EventType::FieldPositionChanged,
            Self::BatterAdvancedInLineup { .. } => EventType::BatterAdvancedInLineup,
        }
    }

    fn stream_id(&self) -> Uuid {
        self.lineup_id().into_inner()
    }

    fn game_id(&self) -> GameId {
        match self {
            Self::TeamLineupCreated { game_id, .. }
            | Self::PlayerAddedToLineup { game_id, .. }
            | Self::PlayerSubstitutedIntoGame { game_id, .. }
            | Self::FieldPositionChanged { game_id, .. }
            | Self::BatterAdvancedInLineup { game_id, .. } => *game_id,
        }
    }
}
