//! Base occupancy.

use scorebook_types::{Base, PlayerId};
use serde::{Deserialize, Serialize};

/// Which runner, if any, stands on each base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasesState {
    first: Option<PlayerId>,
    second: Option<PlayerId>,
    third: Option<PlayerId>,
}

impl BasesState {
    /// Bases with nobody on.
    pub const fn empty() -> Self {
        Self {
            first: None,
            second: None,
            third: None,
        }
    }

    /// The runner on `base`, if any.
    pub const fn runner_on(&self, base: Base) -> Option<PlayerId> {
        match base {
            Base::First => self.first,
            Base::Second => self.second,
            Base::Third => self.third,
        }
    }

    /// Whether nobody is on base.
    pub const fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none() && self.third.is_none()
    }

    /// Occupied bases with their runners, lead runner first.
    pub fn occupied(&self) -> impl Iterator<Item = (Base, PlayerId)> + '_ {
        Base::LEAD_FIRST
            .into_iter()
            .filter_map(|base| self.runner_on(base).map(|runner| (base, runner)))
    }

    /// The most advanced runner.
    pub fn lead_runner(&self) -> Option<(Base, PlayerId)> {
        self.occupied().next()
    }

    /// The base `runner` is standing on.
    pub fn base_of(&self, runner: PlayerId) -> Option<Base> {
        self.occupied()
            .find(|(_, occupant)| *occupant == runner)
            .map(|(base, _)| base)
    }

    /// Runners on second or third.
    pub fn runners_in_scoring_position(&self) -> Vec<PlayerId> {
        self.occupied()
            .filter(|(base, _)| base.is_scoring_position())
            .map(|(_, runner)| runner)
            .collect()
    }

    /// Place `runner` on `base`, replacing whoever was there.
    pub(crate) const fn put(&mut self, base: Base, runner: PlayerId) {
        *self.slot_mut(base) = Some(runner);
    }

    /// Remove whoever is on `base`.
    pub(crate) const fn vacate(&mut self, base: Base) {
        *self.slot_mut(base) = None;
    }

    const fn slot_mut(&mut self, base: Base) -> &mut Option<PlayerId> {
        match base {
            Base::First => &mut self.first,
            Base::Second => &mut self.second,
            Base::Third => &mut self.third,
        }
    }
}
