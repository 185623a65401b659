//! Lore recognition: story flags earned at lifetime milestones.
//!
//! The engine fires [`LoreMilestoneChecker::check_milestones`] after events
//! that move counters (level-ups, resurrections) and forgets about it; the
//! checker mutates story flags and nothing else.

use tracing::info;

use crate::world::{Character, CharacterClass};

/// Story flag texts awarded by the default checker.
pub const FLAG_DEATHS_FAMILIAR: &str = "Death's familiar";
pub const FLAG_SAVIOR_OF_THE_FALLEN: &str = "Savior of the fallen";
pub const FLAG_FROSTBORNE_CHOSEN: &str = "Frostborne's chosen";

/// Milestone recognition hook. Side-effecting and fire-and-forget from the
/// engine's perspective.
pub trait LoreMilestoneChecker: Send + Sync {
    fn check_milestones(&self, character: &mut Character);
}

/// The standard milestone table.
#[derive(Debug, Default)]
pub struct StoryMilestones;

impl StoryMilestones {
    pub fn new() -> Self {
        Self
    }
}

impl LoreMilestoneChecker for StoryMilestones {
    fn check_milestones(&self, character: &mut Character) {
        // Brought back from death three times.
        if character.resurrections_received() >= 3
            && !character.has_story_flag(FLAG_DEATHS_FAMILIAR)
        {
            character.add_story_flag(FLAG_DEATHS_FAMILIAR);
            info!(player = %character.id(), flag = FLAG_DEATHS_FAMILIAR, "story flag earned");
        }

        // A Priest who has pulled five souls back.
        if character.class() == CharacterClass::Priest
            && character.resurrections_performed() >= 5
            && !character.has_story_flag(FLAG_SAVIOR_OF_THE_FALLEN)
        {
            character.add_story_flag(FLAG_SAVIOR_OF_THE_FALLEN);
            info!(player = %character.id(), flag = FLAG_SAVIOR_OF_THE_FALLEN, "story flag earned");
        }

        // Ten boss kills of any tier.
        if character.total_boss_kills() >= 10 && !character.has_story_flag(FLAG_FROSTBORNE_CHOSEN) {
            character.add_story_flag(FLAG_FROSTBORNE_CHOSEN);
            info!(player = %character.id(), flag = FLAG_FROSTBORNE_CHOSEN, "story flag earned");
        }
    }
}

/// Checker that recognizes nothing; for tests and headless setups.
#[derive(Debug, Default)]
pub struct NoMilestones;

impl LoreMilestoneChecker for NoMilestones {
    fn check_milestones(&self, _character: &mut Character) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PlayerId;
    use chrono::{TimeZone, Utc};

    fn priest() -> Character {
        Character::new(
            PlayerId::from("p"),
            "Aldric",
            CharacterClass::Priest,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_rescuer_flag_for_priests_only() {
        let checker = StoryMilestones::new();
        let mut c = priest();
        for _ in 0..5 {
            c.increment_resurrections_performed();
        }
        checker.check_milestones(&mut c);
        assert!(c.has_story_flag(FLAG_SAVIOR_OF_THE_FALLEN));

        let mut w = Character::new(
            PlayerId::from("w"),
            "Thora",
            CharacterClass::Warrior,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        for _ in 0..5 {
            w.increment_resurrections_performed();
        }
        checker.check_milestones(&mut w);
        assert!(!w.has_story_flag(FLAG_SAVIOR_OF_THE_FALLEN));
    }

    #[test]
    fn test_flags_not_awarded_twice() {
        let checker = StoryMilestones::new();
        let mut c = priest();
        for _ in 0..3 {
            c.increment_resurrections_received();
        }
        checker.check_milestones(&mut c);
        checker.check_milestones(&mut c);
        assert_eq!(
            c.story_flags()
                .iter()
                .filter(|f| f.as_str() == FLAG_DEATHS_FAMILIAR)
                .count(),
            1
        );
    }

    #[test]
    fn test_below_threshold_awards_nothing() {
        let checker = StoryMilestones::new();
        let mut c = priest();
        c.increment_resurrections_received();
        checker.check_milestones(&mut c);
        assert!(c.story_flags().is_empty());
    }
}
