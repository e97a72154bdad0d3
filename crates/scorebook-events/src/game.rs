//! Events of the game score/status aggregate.

use scorebook_types::{AggregateKind, GameId, TeamLineupId, TeamSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::EventPayload;
use crate::event_type::EventType;

/// Facts recorded on a game stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum GameEvent {
    /// A game was created.
    GameCreated {
        /// The new game.
        game_id: GameId,
        /// Display name of the game.
        name: String,
        /// Home team name.
        home_team: String,
        /// Visiting team name.
        away_team: String,
    },
    /// The game started with both lineups locked in.
    GameStarted {
        /// The game.
        game_id: GameId,
        /// The home team's lineup stream.
        home_lineup_id: TeamLineupId,
        /// The visiting team's lineup stream.
        away_lineup_id: TeamLineupId,
    },
    /// Runs were added to one side.
    ScoreUpdated {
        /// The game.
        game_id: GameId,
        /// The side that scored.
        side: TeamSide,
        /// Runs added by this update.
        runs: u32,
        /// Inning in which the runs scored.
        inning: u32,
    },
    /// The game is final.
    GameCompleted {
        /// The game.
        game_id: GameId,
        /// Final home score.
        home_score: u32,
        /// Final visiting score.
        away_score: u32,
        /// Why the game ended (regulation, mercy rule, time limit, ...).
        reason: String,
    },
}

impl EventPayload for GameEvent {
    const KIND: AggregateKind = AggregateKind::Game;

    fn event_type(&self) -> EventType {
        match self {
            Self::GameCreated { .. } => EventType::GameCreated,
            Self::GameStarted { .. } => EventType::GameStarted,
            Self::ScoreUpdated { .. } => EventType::ScoreUpdated,
            Self::GameCompleted { .. } => EventType::GameCompleted,
        }
    }

    fn stream_id(&self) -> Uuid {
        self.game_id().into_inner()
    }

    fn game_id(&self) -> GameId {
        match self {
            Self::GameCreated { game_id, .. }
            | Self::GameStarted { game_id, .. }
            | Self::ScoreUpdated { game_id, .. }
            | Self::GameCompleted { game_id, .. } => *game_id,
        }
    }
}
