//! Enumeration types shared by the aggregates, the event codec, and the
//! stores.
//!
//! Wire names follow the scorekeeping vocabulary (`HOME_RUN`, `FIRST`,
//! `TOP`), except [`AggregateKind`] which uses the stream kind names
//! persisted in the event envelope.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Aggregate kinds
// ---------------------------------------------------------------------------

/// The kind of aggregate that owns an event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AggregateKind {
    /// Game score and status.
    Game,
    /// One team's batting order and defensive assignments.
    TeamLineup,
    /// Inning, half, outs, and base occupancy.
    InningState,
}

impl AggregateKind {
    /// Every aggregate kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::Game, Self::TeamLineup, Self::InningState];

    /// The name stored in the `aggregate_kind` column of the event envelope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game => "Game",
            Self::TeamLineup => "TeamLineup",
            Self::InningState => "InningState",
        }
    }

    /// Parse a stored kind name. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl core::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Teams and halves
// ---------------------------------------------------------------------------

/// Which team a lineup, score, or batting pointer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamSide {
    /// The home team bats in the bottom half.
    Home,
    /// The visiting team bats in the top half.
    Away,
}

/// One half of an inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Half {
    /// The visitors bat.
    Top,
    /// The home team bats.
    Bottom,
}

impl Half {
    /// The half that follows this one.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// The team at bat during this half.
    pub const fn batting_side(self) -> TeamSide {
        match self {
            Self::Top => TeamSide::Away,
            Self::Bottom => TeamSide::Home,
        }
    }

    /// Whether this is the top half.
    pub const fn is_top(self) -> bool {
        matches!(self, Self::Top)
    }
}

// ---------------------------------------------------------------------------
// Bases and runner movement
// ---------------------------------------------------------------------------

/// A base a runner can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Base {
    /// First base.
    First,
    /// Second base.
    Second,
    /// Third base.
    Third,
}

impl Base {
    /// All bases, lead base last.
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// All bases, lead base first. Runner advancement walks this order so a
    /// runner never moves onto a base that has not been vacated yet.
    pub const LEAD_FIRST: [Self; 3] = [Self::Third, Self::Second, Self::First];

    /// Bases from which a single hit usually scores a runner.
    pub const fn is_scoring_position(self) -> bool {
        matches!(self, Self::Second | Self::Third)
    }

    /// Where a runner standing here ends up after advancing `bases` bases.
    pub const fn advanced_by(self, bases: u8) -> RunnerDestination {
        let index: u8 = match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        };
        RunnerDestination::from_index(index.saturating_add(bases))
    }
}

/// Where a runner ends a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerDestination {
    /// Safe at first.
    First,
    /// Safe at second.
    Second,
    /// Safe at third.
    Third,
    /// Crossed the plate; a run scores.
    Home,
    /// Put out on the play.
    Out,
}

impl RunnerDestination {
    /// The base this destination occupies, if any.
    pub const fn base(self) -> Option<Base> {
        match self {
            Self::First => Some(Base::First),
            Self::Second => Some(Base::Second),
            Self::Third => Some(Base::Third),
            Self::Home | Self::Out => None,
        }
    }

    /// Map a base count (1 = first, 4+ = home) to a destination. Zero is
    /// treated as first since the batter always reaches at least first.
    const fn from_index(index: u8) -> Self {
        match index {
            0 | 1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            _ => Self::Home,
        }
    }
}

impl From<Base> for RunnerDestination {
    fn from(base: Base) -> Self {
        match base {
            Base::First => Self::First,
            Base::Second => Self::Second,
            Base::Third => Self::Third,
        }
    }
}

// ---------------------------------------------------------------------------
// Plate appearance outcomes
// ---------------------------------------------------------------------------

/// The outcome of a completed at-bat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtBatResultType {
    /// Batter reaches first on a hit.
    Single,
    /// Batter reaches second on a hit.
    Double,
    /// Batter reaches third on a hit.
    Triple,
    /// Batter and every runner score.
    HomeRun,
    /// Batter awarded first on balls.
    Walk,
    /// Batter reaches first on a fielding error.
    Error,
    /// Batter struck out.
    Strikeout,
    /// Batter grounded out.
    GroundOut,
    /// Batter flied out.
    FlyOut,
    /// Batter flied out; a runner may tag up and score from third.
    SacrificeFly,
    /// Lead runner forced out; batter reaches first.
    FieldersChoice,
    /// Batter and the lead runner are both put out.
    DoublePlay,
}

impl AtBatResultType {
    /// Whether the batter is put out on this result.
    pub const fn is_batter_out(self) -> bool {
        matches!(
            self,
            Self::Strikeout
                | Self::GroundOut
                | Self::FlyOut
                | Self::SacrificeFly
                | Self::DoublePlay
        )
    }
}

/// Why a runner moved. Recorded on every `RunnerAdvanced` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceReason {
    /// Advanced on a base hit. Also the fallback when no better reason is
    /// known for the result that caused the movement.
    Hit,
    /// Forced or awarded on a walk.
    Walk,
    /// Advanced on a fielding error.
    Error,
    /// Reached or advanced on a fielder's choice.
    FieldersChoice,
    /// Advanced on a sacrifice.
    Sacrifice,
}

impl AdvanceReason {
    /// The advance reason implied by an at-bat result.
    ///
    /// Results that carry no advancement of their own (strikeouts, ground
    /// and fly outs, double plays) fall back to [`AdvanceReason::Hit`]; a
    /// runner moving during one of those plays is recorded as advancing on
    /// the hit.
    pub const fn for_result(result: AtBatResultType) -> Self {
        match result {
            AtBatResultType::Walk => Self::Walk,
            AtBatResultType::Error => Self::Error,
            AtBatResultType::FieldersChoice => Self::FieldersChoice,
            AtBatResultType::SacrificeFly => Self::Sacrifice,
            AtBatResultType::Single
            | AtBatResultType::Double
            | AtBatResultType::Triple
            | AtBatResultType::HomeRun
            | AtBatResultType::Strikeout
            | AtBatResultType::GroundOut
            | AtBatResultType::FlyOut
            | AtBatResultType::DoublePlay => Self::Hit,
        }
    }
}

// ---------------------------------------------------------------------------
// Defensive positions
// ---------------------------------------------------------------------------

/// A defensive assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldPosition {
    /// Pitcher (1).
    Pitcher,
    /// Catcher (2).
    Catcher,
    /// First base (3).
    FirstBase,
    /// Second base (4).
    SecondBase,
    /// Third base (5).
    ThirdBase,
    /// Shortstop (6).
    Shortstop,
    /// Left field (7).
    LeftField,
    /// Center field (8).
    CenterField,
    /// Right field (9).
    RightField,
    /// Optional tenth fielder.
    ShortFielder,
    /// Bats but does not field. Any number of lineup entries may hold it.
    ExtraPlayer,
}

impl FieldPosition {
    /// The nine positions that must be filled for a lineup to be valid.
    pub const MANDATORY: [Self; 9] = [
        Self::Pitcher,
        Self::Catcher,
        Self::FirstBase,
        Self::SecondBase,
        Self::ThirdBase,
        Self::Shortstop,
        Self::LeftField,
        Self::CenterField,
        Self::RightField,
    ];

    /// Whether at most one active player may hold this position.
    pub const fn is_exclusive(self) -> bool {
        !matches!(self, Self::ExtraPlayer)
    }
}

// ---------------------------------------------------------------------------
// Game status
// ---------------------------------------------------------------------------

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Created, lineups not yet locked in.
    NotStarted,
    /// Being played.
    InProgress,
    /// Final.
    Completed,
}
