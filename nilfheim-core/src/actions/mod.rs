//! The capability set of character actions.
//!
//! Each action is a function of (character, context) producing an
//! [`Outcome`], with its side effects applied to the character before it
//! returns. Eligibility (life-state, charge availability) is enforced by the
//! owning service before dispatch; actions themselves only spend the charge.

mod battle;
mod donate;
mod duel;
mod explore;
mod rest;
mod resurrect;
mod train;

pub use battle::BattleAction;
pub use donate::{eligible_recipients, pick_recipient, CandidateProfile, DONATION_MIN_LEVEL};
pub use duel::DuelEngine;
pub use explore::ExploreAction;
pub use rest::RestAction;
pub use resurrect::ResurrectEngine;
pub use train::TrainAction;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::GuildConfig;
use crate::curse::WorldCurse;
use crate::error::EngineError;
use crate::lore::LoreMilestoneChecker;
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::world::Character;

/// Everything an action needs besides the character: configuration, the
/// clock, the randomness source, the curses active at this instant (resolved
/// once per invocation) and the lore hook.
pub struct ActionContext<'a> {
    pub config: &'a GuildConfig,
    pub now: DateTime<Utc>,
    pub rng: &'a mut dyn Randomizer,
    pub curses: &'a HashSet<WorldCurse>,
    pub lore: &'a dyn LoreMilestoneChecker,
}

impl<'a> ActionContext<'a> {
    pub fn has_curse(&self, curse: WorldCurse) -> bool {
        self.curses.contains(&curse)
    }

    /// Adds XP and runs the milestone hook when a level was gained.
    pub fn grant_xp(&mut self, character: &mut Character, amount: u64) -> bool {
        let leveled_up = character.add_xp(amount);
        if leveled_up {
            self.lore.check_milestones(character);
        }
        leveled_up
    }
}

/// A single interchangeable character action.
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn execute(
        &self,
        character: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError>;
}

/// The registered single-character actions, selectable by name.
pub struct ActionSet {
    actions: HashMap<&'static str, Box<dyn Action>>,
}

impl ActionSet {
    /// The standard capability set: explore, train, rest, battle. Donation,
    /// resurrection and duels involve a second character and run through
    /// their own engines.
    pub fn standard() -> Self {
        let mut set = Self {
            actions: HashMap::new(),
        };
        set.register(Box::new(ExploreAction));
        set.register(Box::new(TrainAction));
        set.register(Box::new(RestAction));
        set.register(Box::new(BattleAction));
        set
    }

    pub fn register(&mut self, action: Box<dyn Action>) {
        self.actions.insert(action.name(), action);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name.to_lowercase().as_str()).map(|a| a.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Scales a base XP amount by the guild multiplier.
pub(crate) fn scale_xp(base: i64, multiplier: f64) -> u64 {
    ((base.max(0) as f64) * multiplier) as u64
}

/// Applies the Clouded Mind penalty (-5 %, floored at 90 % of the raw
/// amount) when the curse is up.
pub(crate) fn clouded_mind_xp(xp: u64, raw: u64, curses: &HashSet<WorldCurse>) -> u64 {
    if curses.contains(&WorldCurse::CurseOfCloudedMind) {
        let reduced = (xp as f64 * 0.95) as u64;
        reduced.max((raw as f64 * 0.90) as u64)
    } else {
        xp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_registers_four_actions() {
        let set = ActionSet::standard();
        assert_eq!(set.names(), vec!["battle", "explore", "rest", "train"]);
        assert!(set.get("battle").is_some());
        assert!(set.get("BATTLE").is_some());
        assert!(set.get("juggle").is_none());
    }

    #[test]
    fn test_scale_xp() {
        assert_eq!(scale_xp(60, 1.0), 60);
        assert_eq!(scale_xp(60, 1.5), 90);
        assert_eq!(scale_xp(-5, 2.0), 0);
    }

    #[test]
    fn test_clouded_mind_floor() {
        let mut curses = HashSet::new();
        assert_eq!(clouded_mind_xp(100, 100, &curses), 100);
        curses.insert(WorldCurse::CurseOfCloudedMind);
        assert_eq!(clouded_mind_xp(100, 100, &curses), 95);
        // The floor keeps the penalty from stacking below 90 % of raw.
        assert_eq!(clouded_mind_xp(90, 100, &curses), 90);
    }
}
