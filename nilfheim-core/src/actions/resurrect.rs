//! Resurrection: the Priest's free action over a second character.
//!
//! A dead target comes back at half HP into a recovery window; a living one
//! receives a small blessing instead. Neither branch consumes a charge.

use super::ActionContext;
use crate::curse::{WorldCurse, DEFAULT_RECOVERY_HOURS, FADING_HOPE_RECOVERY_HOURS};
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::rng::pick;
use crate::world::{Character, CharacterClass, LifeState, WorldFlag};

/// XP granted to the Priest for a true resurrection / for a blessing.
const RESURRECTION_XP: u64 = 5;
const BLESSING_XP: u64 = 2;

const RESURRECTION_MESSAGES: &[&str] = &[
    "{priest} calls forth ancient power, and {target} gasps back to life at half strength.",
    "A surge of holy brilliance erupts. {target} rises from death's grasp, weak but alive.",
    "'Return,' whispers the spirit choir through {priest}. {target} stirs, reborn and fragile.",
    "A sacred wind sweeps the realm as {priest} chants. {target}'s soul snaps back into their body.",
    "Death loosens its hold where {priest} intervenes. {target} returns, needing time to recover.",
    "The veil parts under {priest}'s prayer and {target} walks back through it, trembling.",
];

const BLESSING_MESSAGES: &[&str] = &[
    "{priest} meditates, but {target} is already alive. A soft blessing settles on them instead.",
    "The spirits whisper to {priest}: 'this soul still walks.' {target} is lightly blessed.",
    "{priest} calls to the heavens, yet {target} breathes strongly. Warm light surrounds them.",
    "A halo forms over {target}, then fades; untouched by death, they keep a gentle blessing.",
    "Holy radiance descends, confirms {target}'s life, and leaves them quietly empowered.",
    "No fallen soul found, the spirits sigh. Still, {target} is touched by holiness.",
];

fn flag_flavor(target: &Character) -> Option<&'static str> {
    if target.has_world_flag(WorldFlag::StoneWolfMarked) {
        Some("The Stone Wolf's blessing pulls them back from the void.")
    } else if target.has_world_flag(WorldFlag::FrostwindMarked) {
        Some("Ilyra's winds guide their soul home.")
    } else if target.has_world_flag(WorldFlag::HollowMindMarked) {
        Some("Nereth's power anchors their spirit.")
    } else if target.has_world_flag(WorldFlag::AnchoredSoul) {
        Some("Their soul anchor tethers them to life.")
    } else if target.has_world_flag(WorldFlag::OathOfNull) {
        Some("Their unbound oath defies death itself.")
    } else {
        None
    }
}

/// Resurrection engine. Only Priests may invoke it; the action is free and
/// touches two characters at once, so the service locks both in key order
/// before calling in.
pub struct ResurrectEngine;

impl ResurrectEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn execute_with_target(
        &self,
        priest: &mut Character,
        target: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        if priest.class() != CharacterClass::Priest {
            return Err(EngineError::InvalidActor {
                action: "resurrect",
                required: CharacterClass::Priest,
                actual: priest.class(),
            });
        }

        let fading_hope = ctx.has_curse(WorldCurse::FadingHope);
        let (narrative, xp_gained) = if target.life() == LifeState::Dead {
            let recovery_hours = if fading_hope {
                FADING_HOPE_RECOVERY_HOURS
            } else {
                DEFAULT_RECOVERY_HOURS
            };
            target.revive(recovery_hours, ctx.now);
            priest.increment_resurrections_performed();
            target.increment_resurrections_received();

            let mut narrative = render(*pick(ctx.rng, RESURRECTION_MESSAGES), priest, target);
            if let Some(flavor) = flag_flavor(target) {
                narrative = format!("{narrative} {flavor}");
            }
            // Holy magic and broken oaths do not mix easily.
            if target.class() == CharacterClass::Oathbreaker {
                if target.corruption() >= 2 {
                    target.remove_corruption(2);
                    narrative = format!(
                        "{narrative} The Priest's holy magic grates against the broken oath, \
                         purging some of its corruption."
                    );
                } else {
                    narrative = format!(
                        "{narrative} The broken oath makes the resurrection a complicated affair."
                    );
                }
            }

            ctx.lore.check_milestones(priest);
            ctx.lore.check_milestones(target);
            let xp = if fading_hope {
                RESURRECTION_XP * 2
            } else {
                RESURRECTION_XP
            };
            (narrative, xp)
        } else {
            let narrative = render(*pick(ctx.rng, BLESSING_MESSAGES), priest, target);
            let xp = if fading_hope { BLESSING_XP * 2 } else { BLESSING_XP };
            (narrative, xp)
        };

        let leveled_up = ctx.grant_xp(priest, xp_gained);

        Ok(Outcome {
            narrative,
            xp_gained,
            leveled_up,
            success: true,
            ..Outcome::default()
        })
    }
}

impl Default for ResurrectEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn render(template: &str, priest: &Character, target: &Character) -> String {
    template
        .replace("{priest}", priest.name())
        .replace("{target}", target.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuildConfig;
    use crate::lore::NoMilestones;
    use crate::testing::ScriptedRng;
    use crate::world::PlayerId;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn priest() -> Character {
        Character::new(PlayerId::from("pr"), "Aldric", CharacterClass::Priest, t0())
    }

    fn dead_warrior() -> Character {
        let mut c = Character::new(PlayerId::from("w"), "Thora", CharacterClass::Warrior, t0());
        c.take_damage(100_000);
        c
    }

    fn run(
        priest: &mut Character,
        target: &mut Character,
        curses: HashSet<WorldCurse>,
    ) -> Result<Outcome, EngineError> {
        let config = GuildConfig::new("g");
        let mut rng = ScriptedRng::new();
        let mut ctx = ActionContext {
            config: &config,
            now: t0(),
            rng: &mut rng,
            curses: &curses,
            lore: &NoMilestones,
        };
        ResurrectEngine::new().execute_with_target(priest, target, &mut ctx)
    }

    #[test]
    fn test_non_priest_is_rejected() {
        let mut impostor =
            Character::new(PlayerId::from("m"), "Vex", CharacterClass::Mage, t0());
        let mut target = dead_warrior();
        let err = run(&mut impostor, &mut target, HashSet::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidActor { .. }));
        // The target stays dead; no state was touched.
        assert_eq!(target.life(), LifeState::Dead);
    }

    #[test]
    fn test_resurrects_dead_target() {
        let mut priest = priest();
        let mut target = dead_warrior();
        let outcome = run(&mut priest, &mut target, HashSet::new()).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.xp_gained, 5);
        assert!(matches!(target.life(), LifeState::Recovering { .. }));
        assert_eq!(target.stats().current_hp(), target.stats().max_hp() / 2);
        assert_eq!(priest.resurrections_performed(), 1);
        assert_eq!(target.resurrections_received(), 1);
        // Free action: no charge was spent.
        assert_eq!(priest.action_charges(), 3);
    }

    #[test]
    fn test_alive_target_gets_blessing() {
        let mut priest = priest();
        let mut target =
            Character::new(PlayerId::from("w"), "Thora", CharacterClass::Warrior, t0());
        let outcome = run(&mut priest, &mut target, HashSet::new()).unwrap();

        assert_eq!(outcome.xp_gained, 2);
        assert_eq!(target.life(), LifeState::Alive);
        assert_eq!(target.resurrections_received(), 0);
        assert!(outcome.narrative.contains("Thora"));
    }

    #[test]
    fn test_fading_hope_doubles_xp_and_extends_recovery() {
        let mut priest = priest();
        let mut target = dead_warrior();
        let curses: HashSet<_> = [WorldCurse::FadingHope].into();
        let outcome = run(&mut priest, &mut target, curses).unwrap();

        assert_eq!(outcome.xp_gained, 10);
        match target.life() {
            LifeState::Recovering { until } => {
                assert_eq!(until, t0() + chrono::Duration::hours(36));
            }
            other => panic!("expected recovery, got {other:?}"),
        }
    }

    #[test]
    fn test_oathbreaker_purge_reduces_corruption() {
        let mut priest = priest();
        let mut target =
            Character::new(PlayerId::from("o"), "Kael", CharacterClass::Oathbreaker, t0());
        target.add_corruption(5);
        target.take_damage(100_000);
        let outcome = run(&mut priest, &mut target, HashSet::new()).unwrap();

        assert_eq!(target.corruption(), 3);
        assert!(outcome.narrative.contains("corruption"));
    }

    #[test]
    fn test_world_flag_flavor_appended() {
        let mut priest = priest();
        let mut target = dead_warrior();
        target.add_world_flag(WorldFlag::StoneWolfMarked);
        let outcome = run(&mut priest, &mut target, HashSet::new()).unwrap();
        assert!(outcome.narrative.contains("Stone Wolf"));
    }
}
