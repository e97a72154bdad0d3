//! The event type discriminant persisted in every stored envelope.

use scorebook_types::AggregateKind;
use serde::{Deserialize, Serialize};

/// Every event type the domain currently produces.
///
/// Stored events carry this as a plain string so that streams written by a
/// newer build (with types this build does not know) can still be read;
/// see [`crate::codec::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A game was created.
    GameCreated,
    /// A game moved from not started to in progress.
    GameStarted,
    /// Runs were added to one side's score.
    ScoreUpdated,
    /// A game reached its final state.
    GameCompleted,
    /// A team lineup was created.
    TeamLineupCreated,
    /// A player was added to the starting lineup.
    PlayerAddedToLineup,
    /// A player replaced another in a batting slot.
    PlayerSubstitutedIntoGame,
    /// A player moved to a different defensive position.
    FieldPositionChanged,
    /// The lineup's batting pointer moved to the next slot.
    BatterAdvancedInLineup,
    /// The inning state of a game was created.
    InningStateCreated,
    /// A plate appearance finished.
    AtBatCompleted,
    /// A runner reached or moved to a base.
    RunnerAdvanced,
    /// A runner on base was put out.
    RunnerOut,
    /// A runner crossed the plate.
    RunScored,
    /// Three outs were recorded (or the half was ended manually).
    HalfInningEnded,
    /// The inning number increased.
    InningAdvanced,
}

impl EventType {
    /// Every known event type.
    pub const ALL: [Self; 16] = [
        Self::GameCreated,
        Self::GameStarted,
        Self::ScoreUpdated,
        Self::GameCompleted,
        Self::TeamLineupCreated,
        Self::PlayerAddedToLineup,
        Self::PlayerSubstitutedIntoGame,
        Self::FieldPositionChanged,
        Self::BatterAdvancedInLineup,
        Self::InningStateCreated,
        Self::AtBatCompleted,
        Self::RunnerAdvanced,
        Self::RunnerOut,
        Self::RunScored,
        Self::HalfInningEnded,
        Self::InningAdvanced,
    ];

    /// The string stored in the `event_type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GameCreated => "GameCreated",
            Self::GameStarted => "GameStarted",
            Self::ScoreUpdated => "ScoreUpdated",
            Self::GameCompleted => "GameCompleted",
            Self::TeamLineupCreated => "TeamLineupCreated",
            Self::PlayerAddedToLineup => "PlayerAddedToLineup",
            Self::PlayerSubstitutedIntoGame => "PlayerSubstitutedIntoGame",
            Self::FieldPositionChanged => "FieldPositionChanged",
            Self::BatterAdvancedInLineup => "BatterAdvancedInLineup",
            Self::InningStateCreated => "InningStateCreated",
            Self::AtBatCompleted => "AtBatCompleted",
            Self::RunnerAdvanced => "RunnerAdvanced",
            Self::RunnerOut => "RunnerOut",
            Self::RunScored => "RunScored",
            Self::HalfInningEnded => "HalfInningEnded",
            Self::InningAdvanced => "InningAdvanced",
        }
    }

    /// Parse a stored type name. Returns `None` for names this build does
    /// not know.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }

    /// The aggregate kind whose stream this event type belongs to.
    pub const fn aggregate_kind(self) -> AggregateKind {
        match self {
            Self::GameCreated | Self::GameStarted | Self::ScoreUpdated | Self::GameCompleted => {
                AggregateKind::Game
            }
            Self::TeamLineupCreated
            | Self::PlayerAddedToLineup
            | Self::PlayerSubstitutedIntoGame
            | Self::FieldPositionChanged
            | Self::BatterAdvancedInLineup => AggregateKind::TeamLineup,
            Self::InningStateCreated
            | Self::AtBatCompleted
            | Self::RunnerAdvanced
            | Self::RunnerOut
            | Self::RunScored
            | Self::HalfInningEnded
            | Self::InningAdvanced => AggregateKind::InningState,
        }
    }

    /// Whether this is the creation event of its aggregate kind.
    pub const fn is_creation(self) -> bool {
        matches!(
            self,
            Self::GameCreated | Self::TeamLineupCreated | Self::InningStateCreated
        )
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_exactly_one_creation_event() {
        for kind in AggregateKind::ALL {
            let creations = EventType::ALL
                .iter()
                .filter(|ty| ty.aggregate_kind() == kind && ty.is_creation())
                .count();
            assert_eq!(creations, 1, "{kind}");
        }
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(EventType::parse("RunScored"), Some(EventType::RunScored));
        assert_eq!(EventType::parse("PitchThrown"), None);
    }
}
