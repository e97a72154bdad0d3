//! Team lineup state machine: batting order, defensive assignments, and
//! substitution with starter re-entry.
//!
//! # Re-entry
//!
//! ```text
//! STARTER(active) --substituted--> ELIGIBLE_FOR_REENTRY --re-entered--> REENTERED
//! ```
//!
//! `REENTERED` is terminal: the eligibility is consumed even if the player
//! is substituted out again. A player who enters as a substitute never
//! becomes eligible.

use scorebook_events::TeamLineupEvent;
use scorebook_types::{FieldPosition, GameId, PlayerId, TeamLineupId, TeamSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{self, Aggregate, Outcome};
use crate::error::DomainError;
use crate::inning_state::{MAX_BATTING_SLOTS, next_slot};

/// One player who has appeared on this lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    /// The player.
    pub player_id: PlayerId,
    /// Jersey number as printed.
    pub jersey_number: String,
    /// Player name.
    pub name: String,
    /// Slot the player bats in (or last batted in).
    pub batting_slot: u8,
    /// Current (or last) defensive assignment.
    pub position: FieldPosition,
    /// Whether the player was in the starting lineup.
    pub starter: bool,
    /// Whether the player is currently in the game.
    pub active: bool,
    /// Whether the player has used their one re-entry.
    pub reentry_used: bool,
}

impl LineupPlayer {
    /// A substituted-out starter who has not re-entered yet.
    pub const fn is_reentry_eligible(&self) -> bool {
        self.starter && !self.active && !self.reentry_used
    }
}

/// One entry in a batting slot's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOccupancy {
    /// The player who took the slot.
    pub player_id: PlayerId,
    /// Whether that player started the game.
    pub starter: bool,
    /// Whether the player took the slot by re-entering.
    pub reentry: bool,
    /// Inning the player entered; `None` for the starting lineup.
    pub entered_inning: Option<u32>,
}

/// A batting slot and everyone who has occupied it, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingSlot {
    /// Slot number, 1-20.
    pub slot: u8,
    /// Occupancy history; the last entry is the current occupant.
    pub history: Vec<SlotOccupancy>,
}

impl BattingSlot {
    /// The player currently in this slot.
    pub fn occupant(&self) -> Option<PlayerId> {
        self.history.last().map(|entry| entry.player_id)
    }
}

/// One team's lineup for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLineup {
    id: TeamLineupId,
    game_id: GameId,
    version: u64,
    team_name: String,
    side: TeamSide,
    current_batting_slot: u8,
    slots: Vec<BattingSlot>,
    players: Vec<LineupPlayer>,
}

impl TeamLineup {
    /// Create an empty lineup for one side of a game.
    pub fn create_new(
        id: TeamLineupId,
        game_id: GameId,
        team_name: impl Into<String>,
        side: TeamSide,
    ) -> Result<Outcome<Self>, DomainError> {
        aggregate::create(TeamLineupEvent::TeamLineupCreated {
            lineup_id: id,
            game_id,
            team_name: team_name.into(),
            side,
        })
    }

    /// Aggregate identity.
    pub const fn id(&self) -> TeamLineupId {
        self.id
    }

    /// The game this lineup plays in.
    pub const fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Team name.
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Home or visitors.
    pub const fn side(&self) -> TeamSide {
        self.side
    }

    /// Slot due up next.
    pub const fn current_batting_slot(&self) -> u8 {
        self.current_batting_slot
    }

    /// Place a starter in an empty batting slot.
    pub fn add_player(
        &self,
        player_id: PlayerId,
        jersey_number: impl Into<String>,
        name: impl Into<String>,
        batting_slot: u8,
        position: FieldPosition,
    ) -> Result<Outcome<Self>, DomainError> {
        let jersey_number = jersey_number.into();
        check_slot(batting_slot)?;
        if self.active_player(batting_slot).is_some() {
            return Err(DomainError::SlotOccupied(batting_slot));
        }
        if self.player(player_id).is_some() {
            return Err(DomainError::PlayerAlreadyRostered(player_id));
        }
        self.check_jersey(&jersey_number, None)?;
        self.check_position(position, None)?;

        aggregate::emit(
            self,
            vec![TeamLineupEvent::PlayerAddedToLineup {
                lineup_id: self.id,
                game_id: self.game_id,
                player_id,
                jersey_number,
                name: name.into(),
                batting_slot,
                position,
            }],
        )
    }

    /// Replace the occupant of `batting_slot` with another player.
    ///
    /// With `is_reentry` set, `incoming` must be a starter who is out of
    /// the game and has not re-entered before. They may return into any
    /// slot; their jersey and name stay as rostered. Without it, `incoming` must
    /// be new to the lineup.
    #[allow(clippy::too_many_arguments)]
    pub fn substitute_player(
        &self,
        batting_slot: u8,
        outgoing: PlayerId,
        incoming: PlayerId,
        jersey_number: impl Into<String>,
        name: impl Into<String>,
        position: FieldPosition,
        inning: u32,
        is_reentry: bool,
    ) -> Result<Outcome<Self>, DomainError> {
        check_slot(batting_slot)?;
        if self.active_player(batting_slot).map(|p| p.player_id) != Some(outgoing) {
            return Err(DomainError::NotInSlot {
                player: outgoing,
                slot: batting_slot,
            });
        }

        let (jersey_number, name) = if is_reentry {
            let returning = self.check_reentry(incoming)?;
            (returning.jersey_number.clone(), returning.name.clone())
        } else {
            if self.player(incoming).is_some() {
                return Err(DomainError::PlayerAlreadyRostered(incoming));
            }
            (jersey_number.into(), name.into())
        };
        self.check_jersey(&jersey_number, Some(outgoing))?;
        self.check_position(position, Some(outgoing))?;

        aggregate::emit(
            self,
            vec![TeamLineupEvent::PlayerSubstitutedIntoGame {
                lineup_id: self.id,
                game_id: self.game_id,
                batting_slot,
                outgoing_player_id: outgoing,
                incoming_player_id: incoming,
                jersey_number,
                name,
                position,
                inning,
                is_reentry,
            }],
        )
    }

    /// Move an active player to another defensive position.
    pub fn change_position(
        &self,
        player_id: PlayerId,
        new_position: FieldPosition,
        inning: u32,
    ) -> Result<Outcome<Self>, DomainError> {
        let player = self
            .active(player_id)
            .ok_or(DomainError::PlayerNotRostered(player_id))?;
        if player.position == new_position {
            return Err(DomainError::SamePosition {
                player: player_id,
                position: new_position,
            });
        }
        self.check_position(new_position, Some(player_id))?;

        aggregate::emit(
            self,
            vec![TeamLineupEvent::FieldPositionChanged {
                lineup_id: self.id,
                game_id: self.game_id,
                player_id,
                previous_position: player.position,
                new_position,
                inning,
            }],
        )
    }

    /// Move the batting pointer forward one slot, wrapping from
    /// `total_slots` back to 1.
    pub fn advance_batter(&self, total_slots: u8) -> Result<Outcome<Self>, DomainError> {
        check_slot(total_slots)?;
        let previous_slot = self.current_batting_slot;
        aggregate::emit(
            self,
            vec![TeamLineupEvent::BatterAdvancedInLineup {
                lineup_id: self.id,
                game_id: self.game_id,
                previous_slot,
                new_slot: next_slot(previous_slot, total_slots),
                side: self.side,
            }],
        )
    }

    /// Whether every mandatory defensive position is held by an active
    /// player.
    pub fn is_lineup_valid(&self) -> bool {
        FieldPosition::MANDATORY
            .iter()
            .all(|position| self.active_players().any(|p| p.position == *position))
    }

    /// Current occupants in batting order.
    pub fn batting_order(&self) -> Vec<&LineupPlayer> {
        self.slots
            .iter()
            .filter_map(|slot| slot.occupant())
            .filter_map(|id| self.player(id))
            .collect()
    }

    /// Slots with their occupancy history, in batting order.
    pub fn batting_slots(&self) -> &[BattingSlot] {
        &self.slots
    }

    /// The active player batting in `slot`.
    pub fn active_player(&self, slot: u8) -> Option<&LineupPlayer> {
        self.slots
            .iter()
            .find(|s| s.slot == slot)
            .and_then(BattingSlot::occupant)
            .and_then(|id| self.active(id))
    }

    /// Anyone who has appeared on this lineup, active or not.
    pub fn player(&self, player_id: PlayerId) -> Option<&LineupPlayer> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Defensive position of an active player.
    pub fn position_of(&self, player_id: PlayerId) -> Option<FieldPosition> {
        self.active(player_id).map(|p| p.position)
    }

    /// Whether `player_id` may still re-enter the game.
    pub fn is_reentry_eligible(&self, player_id: PlayerId) -> bool {
        self.player(player_id)
            .is_some_and(LineupPlayer::is_reentry_eligible)
    }

    fn active_players(&self) -> impl Iterator<Item = &LineupPlayer> {
        self.players.iter().filter(|p| p.active)
    }

    fn active(&self, player_id: PlayerId) -> Option<&LineupPlayer> {
        self.active_players().find(|p| p.player_id == player_id)
    }

    /// Jersey numbers are unique among active players. `leaving` is about
    /// to come out of the game and does not count.
    fn check_jersey(&self, jersey: &str, leaving: Option<PlayerId>) -> Result<(), DomainError> {
        let taken = self
            .active_players()
            .any(|p| Some(p.player_id) != leaving && p.jersey_number == jersey);
        if taken {
            Err(DomainError::DuplicateJersey(jersey.to_owned()))
        } else {
            Ok(())
        }
    }

    fn check_position(
        &self,
        position: FieldPosition,
        leaving: Option<PlayerId>,
    ) -> Result<(), DomainError> {
        if !position.is_exclusive() {
            return Ok(());
        }
        let taken = self
            .active_players()
            .any(|p| Some(p.player_id) != leaving && p.position == position);
        if taken {
            Err(DomainError::PositionTaken(position))
        } else {
            Ok(())
        }
    }

    fn check_reentry(&self, incoming: PlayerId) -> Result<&LineupPlayer, DomainError> {
        let refuse = |reason| DomainError::ReentryNotAllowed {
            player: incoming,
            reason,
        };
        let player = self
            .player(incoming)
            .ok_or_else(|| refuse("not on this lineup"))?;
        if !player.starter {
            return Err(refuse("only starters may re-enter"));
        }
        if player.active {
            return Err(refuse("still in the game"));
        }
        if player.reentry_used {
            return Err(refuse("re-entry already used"));
        }
        Ok(player)
    }

    fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut LineupPlayer> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    /// Record a new occupant of `slot`, keeping slots sorted by number.
    fn push_occupancy(&mut self, slot: u8, occupancy: SlotOccupancy) {
        match self.slots.binary_search_by_key(&slot, |s| s.slot) {
            Ok(index) => {
                if let Some(existing) = self.slots.get_mut(index) {
                    existing.history.push(occupancy);
                }
            }
            Err(index) => self.slots.insert(
                index,
                BattingSlot {
                    slot,
                    history: vec![occupancy],
                },
            ),
        }
    }
}

impl Aggregate for TeamLineup {
    type Event = TeamLineupEvent;

    fn stream_id(&self) -> Uuid {
        self.id.into_inner()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn create(event: &TeamLineupEvent) -> Option<Self> {
        match event {
            TeamLineupEvent::TeamLineupCreated {
                lineup_id,
                game_id,
                team_name,
                side,
            } => Some(Self {
                id: *lineup_id,
                game_id: *game_id,
                version: 0,
                team_name: team_name.clone(),
                side: *side,
                current_batting_slot: 1,
                slots: Vec::new(),
                players: Vec::new(),
            }),
            _ => None,
        }
    }

    fn apply(mut self, event: &TeamLineupEvent) -> Self {
        match event {
            TeamLineupEvent::TeamLineupCreated { .. } => {}
            TeamLineupEvent::PlayerAddedToLineup {
                player_id,
                jersey_number,
                name,
                batting_slot,
                position,
                ..
            } => {
                self.players.push(LineupPlayer {
                    player_id: *player_id,
                    jersey_number: jersey_number.clone(),
                    name: name.clone(),
                    batting_slot: *batting_slot,
                    position: *position,
                    starter: true,
                    active: true,
                    reentry_used: false,
                });
                self.push_occupancy(
                    *batting_slot,
                    SlotOccupancy {
                        player_id: *player_id,
                        starter: true,
                        reentry: false,
                        entered_inning: None,
                    },
                );
            }
            TeamLineupEvent::PlayerSubstitutedIntoGame {
                batting_slot,
                outgoing_player_id,
                incoming_player_id,
                jersey_number,
                name,
                position,
                inning,
                is_reentry,
                ..
            } => {
                if let Some(outgoing) = self.player_mut(*outgoing_player_id) {
                    outgoing.active = false;
                }
                let starter = match self.player_mut(*incoming_player_id) {
                    Some(returning) => {
                        returning.active = true;
                        returning.position = *position;
                        returning.batting_slot = *batting_slot;
                        if *is_reentry {
                            returning.reentry_used = true;
                        }
                        returning.starter
                    }
                    None => {
                        self.players.push(LineupPlayer {
                            player_id: *incoming_player_id,
                            jersey_number: jersey_number.clone(),
                            name: name.clone(),
                            batting_slot: *batting_slot,
                            position: *position,
                            starter: false,
                            active: true,
                            reentry_used: false,
                        });
                        false
                    }
                };
                self.push_occupancy(
                    *batting_slot,
                    SlotOccupancy {
                        player_id: *incoming_player_id,
                        starter,
                        reentry: *is_reentry,
                        entered_inning: Some(*inning),
                    },
                );
            }
            TeamLineupEvent::FieldPositionChanged {
                player_id,
                new_position,
                ..
            } => {
                if let Some(player) = self.player_mut(*player_id) {
                    player.position = *new_position;
                }
            }
            TeamLineupEvent::BatterAdvancedInLineup { new_slot, .. } => {
                self.current_batting_slot = *new_slot;
            }
        }
        self
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use scorebook_events::{DomainEvent, EventType};

    use super::*;
    use crate::aggregate::{Tracked, from_events};

    const POSITIONS: [FieldPosition; 9] = FieldPosition::MANDATORY;

    fn empty_lineup() -> TeamLineup {
        TeamLineup::create_new(TeamLineupId::new(), GameId::new(), "Robins", TeamSide::Home)
            .unwrap()
            .state
    }

    /// A full nine-player lineup plus the ids in batting order.
    fn full_lineup() -> (Tracked<TeamLineup>, Vec<PlayerId>) {
        let created =
            TeamLineup::create_new(TeamLineupId::new(), GameId::new(), "Robins", TeamSide::Home)
                .unwrap();
        let mut tracked = Tracked::from_outcome(created);
        let mut ids = Vec::new();
        for (slot, position) in (1u8..).zip(POSITIONS) {
            let id = PlayerId::new();
            tracked
                .execute(|lineup| {
                    lineup.add_player(id, slot.to_string(), format!("Player {slot}"), slot, position)
                })
                .unwrap();
            ids.push(id);
        }
        (tracked, ids)
    }

    #[test]
    fn add_player_fills_slot_and_position() {
        let lineup = empty_lineup();
        let id = PlayerId::new();
        let outcome = lineup
            .add_player(id, "7", "Ada", 1, FieldPosition::Shortstop)
            .unwrap();
        let after = outcome.state;
        assert_eq!(after.active_player(1).unwrap().player_id, id);
        assert_eq!(after.position_of(id), Some(FieldPosition::Shortstop));
        assert_eq!(after.version(), 2);
        assert_eq!(outcome.events[0].event_type(), EventType::PlayerAddedToLineup);
    }

    #[test]
    fn add_player_rejects_conflicts() {
        let (tracked, ids) = full_lineup();
        let lineup = tracked.state();

        let occupied = lineup.add_player(PlayerId::new(), "99", "X", 1, FieldPosition::ExtraPlayer);
        assert_eq!(occupied, Err(DomainError::SlotOccupied(1)));

        let jersey = lineup.add_player(PlayerId::new(), "3", "X", 10, FieldPosition::ShortFielder);
        assert_eq!(jersey, Err(DomainError::DuplicateJersey("3".to_owned())));

        let rostered = lineup.add_player(ids[0], "42", "X", 10, FieldPosition::ShortFielder);
        assert_eq!(rostered, Err(DomainError::PlayerAlreadyRostered(ids[0])));

        let position = lineup.add_player(PlayerId::new(), "42", "X", 10, FieldPosition::Pitcher);
        assert_eq!(position, Err(DomainError::PositionTaken(FieldPosition::Pitcher)));

        let range = lineup.add_player(PlayerId::new(), "42", "X", 21, FieldPosition::ExtraPlayer);
        assert!(matches!(range, Err(DomainError::SlotOutOfRange { .. })));
    }

    #[test]
    fn extra_players_may_share_the_designation() {
        let (mut tracked, _) = full_lineup();
        for slot in 10..=11u8 {
            tracked
                .execute(|lineup| {
                    lineup.add_player(
                        PlayerId::new(),
                        format!("{slot}"),
                        "Extra",
                        slot,
                        FieldPosition::ExtraPlayer,
                    )
                })
                .unwrap();
        }
        assert_eq!(tracked.state().batting_order().len(), 11);
    }

    #[test]
    fn lineup_is_valid_once_nine_positions_are_filled() {
        assert!(!empty_lineup().is_lineup_valid());
        let (tracked, _) = full_lineup();
        assert!(tracked.state().is_lineup_valid());
    }

    #[test]
    fn substitute_replaces_occupant_and_marks_starter_eligible() {
        let (tracked, ids) = full_lineup();
        let sub = PlayerId::new();
        let after = tracked
            .state()
            .substitute_player(4, ids[3], sub, "30", "Sub", FieldPosition::SecondBase, 5, false)
            .unwrap()
            .state;

        assert_eq!(after.active_player(4).unwrap().player_id, sub);
        assert!(after.is_reentry_eligible(ids[3]));
        assert!(!after.is_reentry_eligible(sub));
        assert_eq!(after.position_of(ids[3]), None);
        assert_eq!(after.batting_slots()[3].history.len(), 2);
        assert!(after.is_lineup_valid());
    }

    #[test]
    fn substitute_requires_the_slot_occupant() {
        let (tracked, ids) = full_lineup();
        let result = tracked.state().substitute_player(
            4,
            ids[0],
            PlayerId::new(),
            "30",
            "Sub",
            FieldPosition::SecondBase,
            5,
            false,
        );
        assert_eq!(
            result,
            Err(DomainError::NotInSlot {
                player: ids[0],
                slot: 4
            })
        );
    }

    #[test]
    fn incoming_player_may_reuse_the_outgoing_jersey_and_position() {
        let (tracked, ids) = full_lineup();
        let result = tracked.state().substitute_player(
            1,
            ids[0],
            PlayerId::new(),
            "1",
            "Sub",
            FieldPosition::Pitcher,
            3,
            false,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn starter_reenters_exactly_once() {
        let (mut tracked, ids) = full_lineup();
        let starter = ids[2];
        let sub = PlayerId::new();
        let position = FieldPosition::FirstBase;

        tracked
            .execute(|l| l.substitute_player(3, starter, sub, "30", "Sub", position, 4, false))
            .unwrap();
        tracked
            .execute(|l| l.substitute_player(3, sub, starter, "", "", position, 6, true))
            .unwrap();
        assert!(!tracked.state().is_reentry_eligible(starter));
        assert_eq!(tracked.state().active_player(3).unwrap().player_id, starter);
        assert_eq!(tracked.state().active_player(3).unwrap().jersey_number, "3");

        let second_sub = PlayerId::new();
        tracked
            .execute(|l| l.substitute_player(3, starter, second_sub, "31", "Sub2", position, 7, false))
            .unwrap();
        let again = tracked
            .state()
            .substitute_player(3, second_sub, starter, "", "", position, 8, true);
        assert!(matches!(again, Err(DomainError::ReentryNotAllowed { .. })));
    }

    #[test]
    fn starter_may_reenter_into_another_slot() {
        let (mut tracked, ids) = full_lineup();
        let starter = ids[2];
        let sub = PlayerId::new();
        tracked
            .execute(|l| {
                l.substitute_player(3, starter, sub, "30", "Sub", FieldPosition::FirstBase, 4, false)
            })
            .unwrap();

        // The starter comes back batting fifth, replacing that slot's starter.
        let replaced = ids[4];
        let position = tracked.state().position_of(replaced).unwrap();
        tracked
            .execute(|l| l.substitute_player(5, replaced, starter, "", "", position, 6, true))
            .unwrap();

        let lineup = tracked.state();
        assert_eq!(lineup.active_player(5).unwrap().player_id, starter);
        assert_eq!(lineup.active_player(3).unwrap().player_id, sub);
        assert_eq!(lineup.player(starter).unwrap().batting_slot, 5);
        assert!(!lineup.is_reentry_eligible(starter));
        assert!(lineup.is_reentry_eligible(replaced));
    }

    #[test]
    fn substitutes_never_reenter() {
        let (mut tracked, ids) = full_lineup();
        let sub = PlayerId::new();
        let position = FieldPosition::Catcher;
        tracked
            .execute(|l| l.substitute_player(2, ids[1], sub, "30", "Sub", position, 4, false))
            .unwrap();
        tracked
            .execute(|l| l.substitute_player(2, sub, ids[1], "", "", position, 5, true))
            .unwrap();
        let result = tracked
            .state()
            .substitute_player(2, ids[1], sub, "", "", position, 6, true);
        assert!(matches!(
            result,
            Err(DomainError::ReentryNotAllowed {
                reason: "only starters may re-enter",
                ..
            })
        ));
    }

    #[test]
    fn change_position_validates() {
        let (tracked, ids) = full_lineup();
        let lineup = tracked.state();

        let same = lineup.change_position(ids[0], FieldPosition::Pitcher, 2);
        assert!(matches!(same, Err(DomainError::SamePosition { .. })));

        let taken = lineup.change_position(ids[0], FieldPosition::Catcher, 2);
        assert_eq!(taken, Err(DomainError::PositionTaken(FieldPosition::Catcher)));

        let unknown = lineup.change_position(PlayerId::new(), FieldPosition::ShortFielder, 2);
        assert!(matches!(unknown, Err(DomainError::PlayerNotRostered(_))));

        let moved = lineup
            .change_position(ids[0], FieldPosition::ShortFielder, 2)
            .unwrap()
            .state;
        assert_eq!(moved.position_of(ids[0]), Some(FieldPosition::ShortFielder));
        assert!(!moved.is_lineup_valid());
    }

    #[test]
    fn advance_batter_wraps() {
        let mut lineup = empty_lineup();
        let mut seen = Vec::new();
        for _ in 0..10 {
            let outcome = lineup.advance_batter(9).unwrap();
            lineup = outcome.state;
            seen.push(lineup.current_batting_slot());
        }
        assert_eq!(seen, vec![2, 3, 4, 5, 6, 7, 8, 9, 1, 2]);
        assert!(lineup.advance_batter(0).is_err());
    }

    #[test]
    fn failed_mutation_leaves_state_untouched() {
        let (tracked, _) = full_lineup();
        let before = tracked.state().clone();
        let _ = before.add_player(PlayerId::new(), "1", "Dup", 12, FieldPosition::ExtraPlayer);
        assert_eq!(tracked.state(), &before);
    }

    #[test]
    fn replay_matches_live_lineup() {
        let (mut tracked, ids) = full_lineup();
        let sub = PlayerId::new();
        tracked
            .execute(|l| l.substitute_player(5, ids[4], sub, "50", "Sub", FieldPosition::ThirdBase, 3, false))
            .unwrap();
        tracked
            .execute(|l| l.change_position(sub, FieldPosition::ShortFielder, 4))
            .unwrap();
        tracked.execute(|l| l.advance_batter(9)).unwrap();

        let events: Vec<DomainEvent<TeamLineupEvent>> = tracked.pending().to_vec();
        let live = tracked.into_state();
        let replayed: TeamLineup = from_events(live.stream_id(), &events).unwrap();
        assert_eq!(replayed, live);
        assert_eq!(replayed.version(), u64::try_from(events.len()).unwrap());
    }
}
