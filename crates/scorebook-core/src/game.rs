//! Game score and status aggregate.

use scorebook_events::GameEvent;
use scorebook_types::{GameId, GameStatus, TeamLineupId, TeamSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{self, Aggregate, Outcome};
use crate::error::DomainError;

/// Runs per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Home runs scored.
    pub home: u32,
    /// Visiting runs scored.
    pub away: u32,
}

impl Score {
    /// Runs for `side`.
    pub const fn of(self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    /// The side ahead, or `None` when tied.
    pub const fn leader(self) -> Option<TeamSide> {
        if self.home > self.away {
            Some(TeamSide::Home)
        } else if self.away > self.home {
            Some(TeamSide::Away)
        } else {
            None
        }
    }
}

/// Score, status, and lineup references of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    version: u64,
    name: String,
    home_team: String,
    away_team: String,
    status: GameStatus,
    home_lineup_id: Option<TeamLineupId>,
    away_lineup_id: Option<TeamLineupId>,
    score: Score,
    completion_reason: Option<String>,
}

impl Game {
    /// Create a game that has not started yet.
    pub fn create_new(
        id: GameId,
        name: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Result<Outcome<Self>, DomainError> {
        aggregate::create(GameEvent::GameCreated {
            game_id: id,
            name: name.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
        })
    }

    /// Aggregate identity.
    pub const fn id(&self) -> GameId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Team name for `side`.
    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    /// Lifecycle status.
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Lineup stream for `side`, once the game has started.
    pub const fn lineup_id(&self, side: TeamSide) -> Option<TeamLineupId> {
        match side {
            TeamSide::Home => self.home_lineup_id,
            TeamSide::Away => self.away_lineup_id,
        }
    }

    /// Current score.
    pub const fn score(&self) -> Score {
        self.score
    }

    /// Why the game ended, once completed.
    pub fn completion_reason(&self) -> Option<&str> {
        self.completion_reason.as_deref()
    }

    /// The side that won. `None` until the game is completed, or if it
    /// ended tied.
    pub const fn winner(&self) -> Option<TeamSide> {
        match self.status {
            GameStatus::Completed => self.score.leader(),
            GameStatus::NotStarted | GameStatus::InProgress => None,
        }
    }

    /// Lock in both lineups and start play.
    pub fn start(
        &self,
        home_lineup_id: TeamLineupId,
        away_lineup_id: TeamLineupId,
    ) -> Result<Outcome<Self>, DomainError> {
        self.require(GameStatus::NotStarted)?;
        if home_lineup_id == away_lineup_id {
            return Err(DomainError::InvalidArgument(
                "home and away lineups must differ".to_owned(),
            ));
        }
        aggregate::emit(
            self,
            vec![GameEvent::GameStarted {
                game_id: self.id,
                home_lineup_id,
                away_lineup_id,
            }],
        )
    }

    /// Add runs to one side.
    pub fn record_runs(
        &self,
        side: TeamSide,
        runs: u32,
        inning: u32,
    ) -> Result<Outcome<Self>, DomainError> {
        self.require(GameStatus::InProgress)?;
        if runs == 0 {
            return Err(DomainError::InvalidArgument(
                "at least one run must be recorded".to_owned(),
            ));
        }
        if inning == 0 {
            return Err(DomainError::InvalidArgument(
                "innings start at 1".to_owned(),
            ));
        }
        self.score
            .of(side)
            .checked_add(runs)
            .ok_or(DomainError::Overflow("score"))?;

        aggregate::emit(
            self,
            vec![GameEvent::ScoreUpdated {
                game_id: self.id,
                side,
                runs,
                inning,
            }],
        )
    }

    /// End the game with the current score.
    pub fn complete(&self, reason: impl Into<String>) -> Result<Outcome<Self>, DomainError> {
        self.require(GameStatus::InProgress)?;
        aggregate::emit(
            self,
            vec![GameEvent::GameCompleted {
                game_id: self.id,
                home_score: self.score.home,
                away_score: self.score.away,
                reason: reason.into(),
            }],
        )
    }

    fn require(&self, required: GameStatus) -> Result<(), DomainError> {
        if self.status == required {
            Ok(())
        } else {
            Err(DomainError::InvalidGameStatus {
                required: status_name(required),
                actual: status_name(self.status),
            })
        }
    }
}

impl Aggregate for Game {
    type Event = GameEvent;

    fn stream_id(&self) -> Uuid {
        self.id.into_inner()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn create(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::GameCreated {
                game_id,
                name,
                home_team,
                away_team,
            } => Some(Self {
                id: *game_id,
                version: 0,
                name: name.clone(),
                home_team: home_team.clone(),
                away_team: away_team.clone(),
                status: GameStatus::NotStarted,
                home_lineup_id: None,
                away_lineup_id: None,
                score: Score::default(),
                completion_reason: None,
            }),
            _ => None,
        }
    }

    fn apply(mut self, event: &GameEvent) -> Self {
        match event {
            GameEvent::GameCreated { .. } => {}
            GameEvent::GameStarted {
                home_lineup_id,
                away_lineup_id,
                ..
            } => {
                self.status = GameStatus::InProgress;
                self.home_lineup_id = Some(*home_lineup_id);
                self.away_lineup_id = Some(*away_lineup_id);
            }
            GameEvent::ScoreUpdated { side, runs, .. } => {
                let total = match side {
                    TeamSide::Home => &mut self.score.home,
                    TeamSide::Away => &mut self.score.away,
                };
                *total = total.saturating_add(*runs);
            }
            GameEvent::GameCompleted {
                home_score,
                away_score,
                reason,
                ..
            } => {
                self.status = GameStatus::Completed;
                self.score = Score {
                    home: *home_score,
                    away: *away_score,
                };
                self.completion_reason = Some(reason.clone());
            }
        }
        self
    }
}

const fn status_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::NotStarted => "NOT_STARTED",
        GameStatus::InProgress => "IN_PROGRESS",
        GameStatus::Completed => "COMPLETED",
    }
}
