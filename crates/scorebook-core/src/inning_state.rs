//! Inning and half-inning state machine.
//!
//! Tracks the inning number, which half is being played, outs, each side's
//! batting pointer, and who is on base. Every mutation returns an
//! [`Outcome`] and leaves `self` untouched.
//!
//! # Half-inning cycle
//!
//! ```text
//! TOP(n, outs 0..2) --3rd out--> BOTTOM(n, outs 0, bases empty)
//! BOTTOM(n, outs 0..2) --3rd out--> TOP(n + 1, outs 0, bases empty)
//! ```
//!
//! Each side keeps its own batting pointer. Switching halves hands the bat
//! to the other side's pointer; neither pointer is reset. Game end is
//! decided outside this aggregate.

use scorebook_events::InningStateEvent;
use scorebook_types::{
    AdvanceReason, AtBatResultType, Base, GameId, Half, InningStateId, PlayerId,
    RunnerDestination, TeamSide,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{self, Aggregate, Outcome};
use crate::bases::BasesState;
use crate::error::DomainError;

/// Highest batting slot a lineup may use.
pub const MAX_BATTING_SLOTS: u8 = 20;

/// Batting order length used by [`InningState::create_new`].
pub const DEFAULT_BATTING_ORDER_SIZE: u8 = 9;

/// Outs that end a half-inning.
const OUTS_PER_HALF: u8 = 3;

/// One explicit runner transition passed to
/// [`InningState::advance_runners`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerMovement {
    /// The runner.
    pub runner_id: PlayerId,
    /// Base the runner starts on; `None` for the batter.
    pub from: Option<Base>,
    /// Where the runner ends up.
    pub to: RunnerDestination,
}

impl RunnerMovement {
    /// Build a movement.
    pub const fn new(runner_id: PlayerId, from: Option<Base>, to: RunnerDestination) -> Self {
        Self {
            runner_id,
            from,
            to,
        }
    }
}

/// Read-only view of the current game situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    /// Current inning, starting at 1.
    pub inning: u32,
    /// Current half.
    pub half: Half,
    /// Outs in the current half, 0-2.
    pub outs: u8,
    /// The team at bat.
    pub batting_side: TeamSide,
    /// Slot due up for the team at bat.
    pub batting_slot: u8,
    /// Base occupancy.
    pub bases: BasesState,
    /// Runners on second or third, lead runner first.
    pub runners_in_scoring_position: Vec<PlayerId>,
}

/// Inning/half-inning aggregate of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningState {
    id: InningStateId,
    game_id: GameId,
    version: u64,
    inning: u32,
    half: Half,
    outs: u8,
    away_slot: u8,
    home_slot: u8,
    batting_order_size: u8,
    bases: BasesState,
}

impl InningState {
    /// Start tracking innings for a game with the default batting order
    /// length.
    pub fn create_new(id: InningStateId, game_id: GameId) -> Result<Outcome<Self>, DomainError> {
        Self::create_with_order_size(id, game_id, DEFAULT_BATTING_ORDER_SIZE)
    }

    /// Start tracking innings for a game whose batting orders have
    /// `batting_order_size` slots.
    pub fn create_with_order_size(
        id: InningStateId,
        game_id: GameId,
        batting_order_size: u8,
    ) -> Result<Outcome<Self>, DomainError> {
        check_slot(batting_order_size)?;
        aggregate::create(InningStateEvent::InningStateCreated {
            inning_state_id: id,
            game_id,
            batting_order_size,
        })
    }

    /// Aggregate identity.
    pub const fn id(&self) -> InningStateId {
        self.id
    }

    /// The game this inning state tracks.
    pub const fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Current inning.
    pub const fn inning(&self) -> u32 {
        self.inning
    }

    /// Current half.
    pub const fn half(&self) -> Half {
        self.half
    }

    /// Whether the top half is being played.
    pub const fn is_top_half(&self) -> bool {
        self.half.is_top()
    }

    /// Outs in the current half.
    pub const fn outs(&self) -> u8 {
        self.outs
    }

    /// Base occupancy.
    pub const fn bases(&self) -> &BasesState {
        &self.bases
    }

    /// The team at bat.
    pub const fn batting_team(&self) -> TeamSide {
        self.half.batting_side()
    }

    /// Slot due up for the team at bat.
    pub const fn current_batting_slot(&self) -> u8 {
        self.batting_slot_for(self.batting_team())
    }

    /// Slot due up for `side`, whether or not it is batting now.
    pub const fn batting_slot_for(&self, side: TeamSide) -> u8 {
        match side {
            TeamSide::Away => self.away_slot,
            TeamSide::Home => self.home_slot,
        }
    }

    /// Number of slots each batting pointer cycles through.
    pub const fn batting_order_size(&self) -> u8 {
        self.batting_order_size
    }

    /// Record a completed plate appearance and its automatic runner
    /// advancement.
    ///
    /// Emits `AtBatCompleted`, then one `RunnerAdvanced`, `RunnerOut`, or
    /// `RunScored` per runner affected (lead runner first), then
    /// `HalfInningEnded` and possibly `InningAdvanced` when the play makes
    /// the third out.
    pub fn record_at_bat(
        &self,
        batter: PlayerId,
        batting_slot: u8,
        result: AtBatResultType,
        inning: u32,
    ) -> Result<Outcome<Self>, DomainError> {
        check_slot(batting_slot)?;
        if batting_slot != self.current_batting_slot() {
            return Err(DomainError::BattingOutOfOrder {
                expected: self.current_batting_slot(),
                actual: batting_slot,
            });
        }
        if inning != self.inning {
            return Err(DomainError::InningMismatch {
                expected: self.inning,
                actual: inning,
            });
        }
        if self.bases.base_of(batter).is_some() {
            return Err(DomainError::InvalidPlay {
                reason: format!("batter {batter} is already on base"),
            });
        }
        if result == AtBatResultType::DoublePlay {
            if self.bases.is_empty() {
                return Err(DomainError::InvalidPlay {
                    reason: "double play with nobody on base".to_owned(),
                });
            }
            if self.outs >= OUTS_PER_HALF.saturating_sub(1) {
                return Err(DomainError::InvalidPlay {
                    reason: format!("double play with {} outs", self.outs),
                });
            }
        }

        let mut play = Play::new(self, AdvanceReason::for_result(result));
        play.batter_up(batter, batting_slot, result);

        if !play.is_over() {
            match result {
                AtBatResultType::Single | AtBatResultType::Error => {
                    play.advance_all(1);
                    play.advance(batter, None, Base::First);
                }
                AtBatResultType::Double => {
                    play.advance_all(2);
                    play.advance(batter, None, Base::Second);
                }
                AtBatResultType::Triple => {
                    play.advance_all(3);
                    play.advance(batter, None, Base::Third);
                }
                AtBatResultType::HomeRun => {
                    play.advance_all(4);
                    play.score(batter, None);
                }
                AtBatResultType::Walk => {
                    play.force_toward_first();
                    play.advance(batter, None, Base::First);
                }
                AtBatResultType::SacrificeFly => {
                    if let Some(runner) = play.bases.runner_on(Base::Third) {
                        play.score(runner, Some(Base::Third));
                    }
                }
                AtBatResultType::FieldersChoice => {
                    if let Some((base, runner)) = play.bases.lead_runner() {
                        play.put_out(runner, Some(base));
                    }
                    if !play.is_over() {
                        play.force_toward_first();
                        play.advance(batter, None, Base::First);
                    }
                }
                AtBatResultType::DoublePlay => {
                    if let Some((base, runner)) = play.bases.lead_runner() {
                        play.put_out(runner, Some(base));
                    }
                }
                AtBatResultType::Strikeout
                | AtBatResultType::GroundOut
                | AtBatResultType::FlyOut => {}
            }
        }

        aggregate::emit(self, play.finish()?)
    }

    /// Apply an explicit list of runner transitions, in the order given.
    ///
    /// A destination of `OUT` records an out, `HOME` scores a run, any base
    /// moves the runner there. Reaching the third out ends the half; no
    /// movement may follow it.
    pub fn advance_runners(
        &self,
        result: AtBatResultType,
        movements: &[RunnerMovement],
    ) -> Result<Outcome<Self>, DomainError> {
        if movements.is_empty() {
            return Err(DomainError::InvalidRunnerMovement {
                reason: "no movements given".to_owned(),
            });
        }

        let mut play = Play::new(self, AdvanceReason::for_result(result));
        for movement in movements {
            if play.is_over() {
                return Err(DomainError::InvalidRunnerMovement {
                    reason: "movement listed after the third out".to_owned(),
                });
            }
            play.check_movement(movement)?;
            match movement.to {
                RunnerDestination::Out => play.put_out(movement.runner_id, movement.from),
                RunnerDestination::Home => play.score(movement.runner_id, movement.from),
                RunnerDestination::First | RunnerDestination::Second | RunnerDestination::Third => {
                    if let Some(base) = movement.to.base() {
                        play.advance(movement.runner_id, movement.from, base);
                    }
                }
            }
        }

        aggregate::emit(self, play.finish()?)
    }

    /// End the current half regardless of outs, for callers that decide
    /// inning-ending conditions themselves.
    pub fn end_half_inning(&self) -> Result<Outcome<Self>, DomainError> {
        let payloads = half_inning_transition(self, self.outs)?;
        aggregate::emit(self, payloads)
    }

    /// The current situation. Pure read; emits nothing.
    pub fn current_situation(&self) -> Situation {
        Situation {
            inning: self.inning,
            half: self.half,
            outs: self.outs,
            batting_side: self.batting_team(),
            batting_slot: self.current_batting_slot(),
            bases: self.bases,
            runners_in_scoring_position: self.bases.runners_in_scoring_position(),
        }
    }

    const fn slot_mut(&mut self, side: TeamSide) -> &mut u8 {
        match side {
            TeamSide::Away => &mut self.away_slot,
            TeamSide::Home => &mut self.home_slot,
        }
    }
}

impl Aggregate for InningState {
    type Event = InningStateEvent;

    fn stream_id(&self) -> Uuid {
        self.id.into_inner()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn create(event: &InningStateEvent) -> Option<Self> {
        match event {
            InningStateEvent::InningStateCreated {
                inning_state_id,
                game_id,
                batting_order_size,
            } => Some(Self {
                id: *inning_state_id,
                game_id: *game_id,
                version: 0,
                inning: 1,
                half: Half::Top,
                outs: 0,
                away_slot: 1,
                home_slot: 1,
                batting_order_size: *batting_order_size,
                bases: BasesState::empty(),
            }),
            _ => None,
        }
    }

    fn apply(mut self, event: &InningStateEvent) -> Self {
        match event {
            InningStateEvent::InningStateCreated { .. } => {}
            InningStateEvent::AtBatCompleted {
                batting_slot,
                half,
                batter_out,
                ..
            } => {
                let size = self.batting_order_size;
                *self.slot_mut(half.batting_side()) = next_slot(*batting_slot, size);
                if *batter_out {
                    self.outs = self.outs.saturating_add(1);
                }
            }
            InningStateEvent::RunnerAdvanced {
                runner_id, from, to, ..
            } => {
                if let Some(from) = from {
                    self.bases.vacate(*from);
                }
                self.bases.put(*to, *runner_id);
            }
            InningStateEvent::RunnerOut { from, .. } => {
                if let Some(from) = from {
                    self.bases.vacate(*from);
                }
                self.outs = self.outs.saturating_add(1);
            }
            InningStateEvent::RunScored { from, .. } => {
                if let Some(from) = from {
                    self.bases.vacate(*from);
                }
            }
            InningStateEvent::HalfInningEnded { half, .. } => {
                self.half = half.flipped();
                self.outs = 0;
                self.bases = BasesState::empty();
            }
            InningStateEvent::InningAdvanced { new_inning, .. } => {
                self.inning = *new_inning;
            }
        }
        self
    }
}

/// `(slot mod size) + 1`: the slot after `slot` in an order of `size`.
pub const fn next_slot(slot: u8, size: u8) -> u8 {
    match slot.checked_rem(size) {
        Some(rem) => rem.saturating_add(1),
        None => 1,
    }
}

fn check_slot(slot: u8) -> Result<(), DomainError> {
    if (1..=MAX_BATTING_SLOTS).contains(&slot) {
        Ok(())
    } else {
        Err(DomainError::SlotOutOfRange {
            slot,
            max: MAX_BATTING_SLOTS,
        })
    }
}

/// Events closing the current half: `HalfInningEnded`, plus
/// `InningAdvanced` when the bottom half ends.
fn half_inning_transition(
    state: &InningState,
    outs: u8,
) -> Result<Vec<InningStateEvent>, DomainError> {
    let mut payloads = vec![InningStateEvent::HalfInningEnded {
        inning_state_id: state.id,
        game_id: state.game_id,
        inning: state.inning,
        half: state.half,
        outs,
    }];
    if state.half == Half::Bottom {
        let new_inning = state
            .inning
            .checked_add(1)
            .ok_or(DomainError::Overflow("inning number"))?;
        payloads.push(InningStateEvent::InningAdvanced {
            inning_state_id: state.id,
            game_id: state.game_id,
            previous_inning: state.inning,
            new_inning,
        });
    }
    Ok(payloads)
}

/// Scratch state while a play is being decided. Tracks the bases and outs
/// the emitted events will produce so later decisions see earlier ones.
struct Play<'a> {
    state: &'a InningState,
    reason: AdvanceReason,
    bases: BasesState,
    outs: u8,
    payloads: Vec<InningStateEvent>,
}

impl<'a> Play<'a> {
    fn new(state: &'a InningState, reason: AdvanceReason) -> Self {
        Self {
            state,
            reason,
            bases: state.bases,
            outs: state.outs,
            payloads: Vec::new(),
        }
    }

    const fn is_over(&self) -> bool {
        self.outs >= OUTS_PER_HALF
    }

    fn batter_up(&mut self, batter: PlayerId, batting_slot: u8, result: AtBatResultType) {
        let batter_out = result.is_batter_out();
        if batter_out {
            self.outs = self.outs.saturating_add(1);
        }
        self.payloads.push(InningStateEvent::AtBatCompleted {
            inning_state_id: self.state.id,
            game_id: self.state.game_id,
            batter_id: batter,
            batting_slot,
            result,
            inning: self.state.inning,
            half: self.state.half,
            batter_out,
        });
    }

    fn advance(&mut self, runner: PlayerId, from: Option<Base>, to: Base) {
        if let Some(from) = from {
            self.bases.vacate(from);
        }
        self.bases.put(to, runner);
        self.payloads.push(InningStateEvent::RunnerAdvanced {
            inning_state_id: self.state.id,
            game_id: self.state.game_id,
            runner_id: runner,
            from,
            to,
            reason: self.reason,
        });
    }

    fn score(&mut self, runner: PlayerId, from: Option<Base>) {
        if let Some(from) = from {
            self.bases.vacate(from);
        }
        self.payloads.push(InningStateEvent::RunScored {
            inning_state_id: self.state.id,
            game_id: self.state.game_id,
            runner_id: runner,
            from,
            batting_side: self.state.batting_team(),
            inning: self.state.inning,
        });
    }

    fn put_out(&mut self, runner: PlayerId, from: Option<Base>) {
        if let Some(from) = from {
            self.bases.vacate(from);
        }
        self.outs = self.outs.saturating_add(1);
        self.payloads.push(InningStateEvent::RunnerOut {
            inning_state_id: self.state.id,
            game_id: self.state.game_id,
            runner_id: runner,
            from,
        });
    }

    /// Move every runner `bases` bases forward, lead runner first.
    fn advance_all(&mut self, bases: u8) {
        let runners: Vec<(Base, PlayerId)> = self.bases.occupied().collect();
        for (base, runner) in runners {
            match base.advanced_by(bases).base() {
                Some(to) => self.advance(runner, Some(base), to),
                None => self.score(runner, Some(base)),
            }
        }
    }

    /// Push forced runners ahead so the batter can take first.
    fn force_toward_first(&mut self) {
        let Some(on_first) = self.bases.runner_on(Base::First) else {
            return;
        };
        if let Some(on_second) = self.bases.runner_on(Base::Second) {
            if let Some(on_third) = self.bases.runner_on(Base::Third) {
                self.score(on_third, Some(Base::Third));
            }
            self.advance(on_second, Some(Base::Second), Base::Third);
        }
        self.advance(on_first, Some(Base::First), Base::Second);
    }

    fn check_movement(&self, movement: &RunnerMovement) -> Result<(), DomainError> {
        match movement.from {
            Some(base) => {
                if self.bases.runner_on(base) != Some(movement.runner_id) {
                    return Err(DomainError::RunnerNotOnBase {
                        runner: movement.runner_id,
                        base,
                    });
                }
            }
            None => {
                if self.bases.base_of(movement.runner_id).is_some() {
                    return Err(DomainError::InvalidRunnerMovement {
                        reason: format!(
                            "runner {} is on base but no starting base was given",
                            movement.runner_id
                        ),
                    });
                }
            }
        }

        if let Some(to) = movement.to.base() {
            if movement.from.is_some_and(|from| from >= to) {
                return Err(DomainError::InvalidRunnerMovement {
                    reason: format!("runner {} cannot move backwards", movement.runner_id),
                });
            }
            if self.bases.runner_on(to).is_some() {
                return Err(DomainError::InvalidRunnerMovement {
                    reason: format!("{to:?} is occupied"),
                });
            }
        }
        Ok(())
    }

    /// The decided events, closed off with the half-inning transition if
    /// the play made the third out.
    fn finish(mut self) -> Result<Vec<InningStateEvent>, DomainError> {
        if self.is_over() {
            let closing = half_inning_transition(self.state, OUTS_PER_HALF)?;
            self.payloads.extend(closing);
        }
        Ok(self.payloads)
    }
}
