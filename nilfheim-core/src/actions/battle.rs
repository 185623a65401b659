//! Battle: single-shot PvE combat against a catalog enemy.
//!
//! Randomness is drawn in a fixed order so a scripted source can force any
//! outcome: enemy pick, level jitter, elite spawn block (spawn chance,
//! power/damage fractions, trait count + picks, detection line, escape
//! chance [, escape-damage fraction, escape line | failure line]), player
//! roll, enemy roll, elite XP fraction, elite material drops, regular drop.

use super::{scale_xp, Action, ActionContext};
use crate::catalog::{EliteTrait, ENEMIES};
use crate::error::EngineError;
use crate::inventory::{CatalystKind, EssenceKind};
use crate::outcome::{EliteEncounter, Outcome};
use crate::rng::{pick, Randomizer};
use crate::world::{Character, CharacterClass};

/// Elites only stalk characters of at least this level.
const ELITE_MIN_LEVEL: u32 = 6;

/// Elite spawn chance, and the raised chance past level 15.
const ELITE_SPAWN_CHANCE: f64 = 0.05;
const ELITE_SPAWN_CHANCE_HIGH: f64 = 0.08;
const ELITE_HIGH_LEVEL: u32 = 15;

/// Essence drop chance on victory / defeat.
const VICTORY_DROP_CHANCE: f64 = 0.20;
const DEFEAT_DROP_CHANCE: f64 = 0.05;

const ELITE_DETECTION: &[&str] = &[
    "Something is wrong. This foe has survived too many hunters.",
    "Ancient runes shimmer across the enemy's hide. Power radiates from it.",
    "The ground frosts over as it approaches. The world itself favors this one.",
    "Its movements are too precise, too deliberate. No ordinary enemy.",
    "Dark energy crackles around the creature. This battle will be different.",
];

const ELITE_VICTORY_LINES: &[&str] = &[
    "Against all odds the elite falls, and you are still standing.",
    "The elite's enhanced strength made every exchange a gamble, but you prevailed.",
    "You matched the elite blow for blow until something in it finally broke.",
    "Hard-won and well-deserved: the elite lies defeated at your feet.",
];

const ELITE_DEFEAT_LINES: &[&str] = &[
    "The elite's strength is simply too much, and you are driven back.",
    "You fought with everything you had; the elite barely noticed.",
    "Its enhanced power breaks through your guard and the ground meets you hard.",
    "You survive the elite's onslaught, barely, and only by retreating.",
];

const WITHDRAWAL_SUCCESS_LINES: &[&str] = &[
    "You trust your instincts and slip away before the creature can strike.",
    "Discretion wins: you withdraw, and the elite hunts other prey tonight.",
    "A burst of speed carries you clear of the elite's reach.",
    "You melt into the snowfall and leave the elite circling nothing.",
];

const WITHDRAWAL_FAILURE_LINES: &[&str] = &[
    "You turn to flee, but the elite anticipates you and strikes first.",
    "The elite cuts off your retreat with unnatural speed.",
    "Your escape fails; the creature was already behind you.",
];

/// Battle action. High XP on victory, heavy damage on defeat, and the only
/// action that can kill a character.
pub struct BattleAction;

impl Action for BattleAction {
    fn name(&self) -> &'static str {
        "battle"
    }

    fn description(&self) -> &'static str {
        "Battle an enemy for high XP rewards"
    }

    fn execute(
        &self,
        character: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        let enemy = pick(ctx.rng, ENEMIES);
        let enemy_level = (character.level() as i32 + ctx.rng.jitter(-1, 1)).max(1) as u32;
        let enemy_power = 20 + 8 * enemy_level;

        // Elite spawn block.
        let mut is_elite = false;
        let mut elite_power_factor = 1.0;
        let mut elite_damage_factor = 1.0;
        let mut elite_traits: Vec<EliteTrait> = Vec::new();
        let mut detection = String::new();
        if character.level() >= ELITE_MIN_LEVEL {
            let spawn_chance = if character.level() >= ELITE_HIGH_LEVEL {
                ELITE_SPAWN_CHANCE_HIGH
            } else {
                ELITE_SPAWN_CHANCE
            };
            if ctx.rng.chance(spawn_chance) {
                is_elite = true;
                elite_power_factor = 1.40 + ctx.rng.fraction() * 0.20;
                elite_damage_factor = 1.25 + ctx.rng.fraction() * 0.15;
                let trait_count = if ctx.rng.chance(0.70) { 1 } else { 2 };
                elite_traits = draw_traits(ctx.rng, trait_count);
                detection = (*pick(ctx.rng, ELITE_DETECTION)).to_string();

                // One chance to slip away before the fight starts.
                let agi_or_luck = character
                    .stats()
                    .agility()
                    .max(character.stats().luck());
                let escape_chance = 0.60 + agi_or_luck as f64 / 200.0;
                if ctx.rng.chance(escape_chance) {
                    return withdraw(character, ctx, detection, elite_traits);
                }
                // Failed escape: the elite lands the first strike.
                elite_damage_factor *= 1.25;
                let failure = *pick(ctx.rng, WITHDRAWAL_FAILURE_LINES);
                detection = format!("{detection} {failure}");
            }
        }

        // Decision rolls. Power comes from the class capability table; elite
        // traits and Oathbreaker corruption scale it.
        let data = character.class().data();
        let mut player_power = data.power(character.stats()) as f64;
        for t in &elite_traits {
            player_power *= t.player_power_factor(data.power_primary);
        }
        if character.class() == CharacterClass::Oathbreaker {
            player_power *= 1.0 + character.corruption() as f64 * 0.01;
        }
        let player_power = (player_power as u32).max(1);
        let effective_enemy_power = ((enemy_power as f64 * elite_power_factor) as u32).max(1);

        let player_roll = ctx.rng.roll(player_power) + 2 * character.stats().luck();
        let enemy_roll = ctx.rng.roll(effective_enemy_power);
        let victory = player_roll > enemy_roll;

        let mut xp_gained = if victory {
            scale_xp(50 + 10 * enemy_level as i64, ctx.config.xp_multiplier())
        } else {
            scale_xp(20 + 4 * enemy_level as i64, ctx.config.xp_multiplier())
        };
        if is_elite && victory {
            xp_gained = (xp_gained as f64 * (1.30 + ctx.rng.fraction() * 0.20)) as u64;
        }

        let base_damage = if victory {
            (3 * enemy_level).max(5)
        } else {
            (8 * enemy_level).max(10)
        };
        let mut damage = base_damage as f64 * elite_damage_factor;
        for t in &elite_traits {
            damage *= t.enemy_damage_factor();
        }
        damage *= data.damage_taken_factor;
        let mut damage_taken = (damage as u32).max(1);

        let mut narrative = if victory {
            format!(
                "You encountered a {} (Level {}) and emerged victorious! \
                 Your combat prowess proved superior, though you sustained wounds.",
                enemy.name, enemy_level
            )
        } else {
            let severity = if enemy_level >= 5 {
                "You suffered severe injuries in the encounter."
            } else {
                "You escaped, but not without significant injury."
            };
            format!(
                "You encountered a {} (Level {}) but were defeated. {severity} \
                 Learn from this experience!",
                enemy.name, enemy_level
            )
        };
        if is_elite {
            let elite_line = if victory {
                *pick(ctx.rng, ELITE_VICTORY_LINES)
            } else {
                *pick(ctx.rng, ELITE_DEFEAT_LINES)
            };
            let trait_names: Vec<&str> = elite_traits.iter().map(|t| t.name()).collect();
            narrative = format!(
                "{detection}\n{narrative}\n{elite_line}\nElite traits: {}.",
                trait_names.join(", ")
            );
        }

        let mut survived = character.take_damage(damage_taken);

        // A dying unstable essence detonates even as the elite falls.
        if victory && survived && elite_traits.iter().any(|t| t.explodes_on_death()) {
            let explosion = (character.stats().max_hp() / 20).max(1);
            survived = character.take_damage(explosion);
            damage_taken += explosion;
            narrative = format!(
                "{narrative}\nThe elite's unstable essence detonates for {explosion} unavoidable damage!"
            );
        }

        if !survived {
            // Death halves the XP earned, whichever path produced it.
            xp_gained /= 2;
            narrative = format!("{narrative}\nYou have fallen in battle! A Priest can resurrect you.");
        }

        if victory {
            character.increment_enemies_killed();
            if is_elite {
                character.increment_elites_killed();
                if character.class() == CharacterClass::Oathbreaker {
                    character.add_corruption(1);
                }
            }
        }

        // Drops: elites guarantee one crafting material on victory, then the
        // regular essence roll applies either way.
        let mut essence_drops = Vec::new();
        let mut catalyst_drops = Vec::new();
        if is_elite && victory {
            if ctx.rng.chance(0.5) {
                let catalyst = *pick(ctx.rng, &CatalystKind::all());
                character.inventory_mut().add_catalyst(catalyst, 1);
                catalyst_drops.push((catalyst, 1));
            } else {
                let essence = *pick(ctx.rng, &EssenceKind::all());
                character.inventory_mut().add_essence(essence, 1);
                essence_drops.push((essence, 1));
            }
        }
        let drop_chance = if victory {
            VICTORY_DROP_CHANCE
        } else {
            DEFEAT_DROP_CHANCE
        };
        if ctx.rng.chance(drop_chance) {
            let essence = *pick(ctx.rng, &EssenceKind::all());
            character.inventory_mut().add_essence(essence, 1);
            essence_drops.push((essence, 1));
        }

        let leveled_up = ctx.grant_xp(character, xp_gained);
        character.spend_charge(ctx.now)?;

        Ok(Outcome {
            narrative,
            xp_gained,
            leveled_up,
            damage_taken,
            success: victory,
            essence_drops,
            catalyst_drops,
            elite: is_elite.then_some(EliteEncounter {
                traits: elite_traits,
                withdrew: false,
            }),
            ..Outcome::default()
        })
    }
}

/// Successful escape from an elite: a scratch of damage, no XP, no fight.
fn withdraw(
    character: &mut Character,
    ctx: &mut ActionContext<'_>,
    detection: String,
    traits: Vec<EliteTrait>,
) -> Result<Outcome, EngineError> {
    let escape_damage =
        ((character.stats().max_hp() as f64 * (0.05 + ctx.rng.fraction() * 0.05)) as u32).max(1);
    character.take_damage(escape_damage);
    let line = *pick(ctx.rng, WITHDRAWAL_SUCCESS_LINES);
    character.spend_charge(ctx.now)?;

    let trait_names: Vec<&str> = traits.iter().map(|t| t.name()).collect();
    Ok(Outcome {
        narrative: format!(
            "{detection}\n{line}\nElite traits: {}.",
            trait_names.join(", ")
        ),
        damage_taken: escape_damage,
        success: false,
        elite: Some(EliteEncounter {
            traits,
            withdrew: true,
        }),
        ..Outcome::default()
    })
}

/// Draws distinct elite traits from the trait table.
fn draw_traits(rng: &mut dyn Randomizer, count: usize) -> Vec<EliteTrait> {
    let mut pool: Vec<EliteTrait> = EliteTrait::all().to_vec();
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count.min(pool.len()) {
        let index = rng.roll(pool.len() as u32) as usize;
        drawn.push(pool.remove(index));
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuildConfig;
    use crate::lore::NoMilestones;
    use crate::testing::ScriptedRng;
    use crate::world::{LifeState, PlayerId};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn run_battle(
        character: &mut Character,
        config: &GuildConfig,
        rng: &mut ScriptedRng,
    ) -> Outcome {
        let curses = HashSet::new();
        let mut ctx = ActionContext {
            config,
            now: t0(),
            rng,
            curses: &curses,
            lore: &NoMilestones,
        };
        BattleAction.execute(character, &mut ctx).unwrap()
    }

    #[test]
    fn test_seeded_warrior_victory_scenario() {
        // Level-1 Warrior: STR 17, LUCK 7 -> power 41. Forced rolls 40 vs 10
        // at enemy level 1 (power 28): 40 + 14 = 54 > 10, victory.
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        let config = GuildConfig::new("g");
        // Draws: enemy index, level jitter, player roll, enemy roll.
        let mut rng = ScriptedRng::new().rolls([0, 40, 10]).jitters([0]);
        let outcome = run_battle(&mut c, &config, &mut rng);

        assert!(outcome.success);
        assert_eq!(outcome.xp_gained, 60);
        assert_eq!(outcome.damage_taken, 5);
        assert_eq!(c.enemies_killed(), 1);
        assert_eq!(c.stats().current_hp(), c.stats().max_hp() - 5);
        assert_eq!(c.action_charges(), 2);
    }

    #[test]
    fn test_xp_multiplier_scales_victory_xp() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        let mut config = GuildConfig::new("g");
        config.set_xp_multiplier(1.5).unwrap();
        let mut rng = ScriptedRng::new().rolls([0, 40, 10]).jitters([0]);
        let outcome = run_battle(&mut c, &config, &mut rng);
        assert_eq!(outcome.xp_gained, 90);
    }

    #[test]
    fn test_defeat_takes_heavy_damage_and_no_kill() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        let config = GuildConfig::new("g");
        // Player rolls 0 + 14 luck = 14; enemy rolls 20.
        let mut rng = ScriptedRng::new().rolls([0, 0, 20]).jitters([0]);
        let outcome = run_battle(&mut c, &config, &mut rng);

        assert!(!outcome.success);
        assert_eq!(outcome.xp_gained, 24);
        assert_eq!(outcome.damage_taken, 10);
        assert_eq!(c.enemies_killed(), 0);
    }

    #[test]
    fn test_knight_soaks_fifteen_percent() {
        let mut c = Character::new(PlayerId::from("p"), "Ulf", CharacterClass::Knight, t0());
        let config = GuildConfig::new("g");
        // Force a defeat at enemy level 2: base damage 16, soaked to 13.
        let mut rng = ScriptedRng::new().rolls([0, 0, 30]).jitters([1]);
        let outcome = run_battle(&mut c, &config, &mut rng);
        assert!(!outcome.success);
        assert_eq!(outcome.damage_taken, 13);
    }

    #[test]
    fn test_death_halves_xp_and_sets_dead() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        // Leave exactly enough HP for the defeat damage to finish the job.
        let hp = c.stats().current_hp();
        c.stats_mut().take_damage(hp - 10);
        let config = GuildConfig::new("g");
        let mut rng = ScriptedRng::new().rolls([0, 0, 20]).jitters([0]);
        let outcome = run_battle(&mut c, &config, &mut rng);

        assert!(!outcome.success);
        assert_eq!(c.life(), LifeState::Dead);
        assert_eq!(c.stats().current_hp(), 0);
        // Defeat XP at level 1 is 24; death halves it.
        assert_eq!(outcome.xp_gained, 12);
        assert_eq!(c.xp(), 12);
    }

    #[test]
    fn test_victory_drop_adds_essence() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        let config = GuildConfig::new("g");
        // Drop roll succeeds, essence index 2 (Mind Crystal).
        let mut rng = ScriptedRng::new().rolls([0, 40, 10, 2]).jitters([0]).chances([true]);
        let outcome = run_battle(&mut c, &config, &mut rng);
        assert_eq!(outcome.essence_drops.len(), 1);
        assert_eq!(
            c.inventory().essence_count(outcome.essence_drops[0].0),
            1
        );
    }

    #[test]
    fn test_low_level_character_never_meets_elites() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        let config = GuildConfig::new("g");
        // Even with every chance scripted true, level 1 skips the elite block.
        let mut rng = ScriptedRng::new()
            .rolls([0, 40, 10])
            .jitters([0])
            .chances([true, true, true]);
        let outcome = run_battle(&mut c, &config, &mut rng);
        assert!(outcome.elite.is_none());
    }

    #[test]
    fn test_elite_fight_pays_bonus_xp_and_material() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        c.add_xp(100 + 282 + 519 + 800 + 1118 + 1469); // straight to level 7
        assert!(c.level() >= ELITE_MIN_LEVEL);
        let config = GuildConfig::new("g");
        // chances: elite spawn, single trait, escape fails, material=catalyst,
        // no regular drop. fractions: power 0.0, damage 0.0, xp bonus 0.0.
        // rolls: enemy, trait index 3 (Blood Frenzied), detection line,
        // failure line, player, enemy, elite victory line, catalyst index.
        let mut rng = ScriptedRng::new()
            .rolls([0, 3, 0, 0, 500, 0, 0, 1])
            .jitters([0])
            .chances([true, true, false, true])
            .fractions([0.0, 0.0, 0.0]);
        let curses = HashSet::new();
        let mut ctx = ActionContext {
            config: &config,
            now: t0(),
            rng: &mut rng,
            curses: &curses,
            lore: &NoMilestones,
        };
        let outcome = BattleAction.execute(&mut c, &mut ctx).unwrap();

        assert!(outcome.success);
        let elite = outcome.elite.as_ref().expect("elite encounter");
        assert!(!elite.withdrew);
        assert_eq!(elite.traits, vec![EliteTrait::BloodFrenzied]);
        // Victory XP at level 7: 50 + 70 = 120, elite bonus 1.30 -> 156.
        assert_eq!(outcome.xp_gained, 156);
        assert_eq!(outcome.catalyst_drops.len(), 1);
        assert_eq!(c.elites_killed(), 1);
    }

    #[test]
    fn test_elite_withdrawal_costs_hp_but_no_xp() {
        let mut c = Character::new(PlayerId::from("p"), "Thora", CharacterClass::Warrior, t0());
        c.add_xp(100 + 282 + 519 + 800 + 1118 + 1469);
        let config = GuildConfig::new("g");
        // chances: elite spawn, single trait, escape succeeds.
        // fractions: power, damage, escape-damage sample.
        let mut rng = ScriptedRng::new()
            .rolls([0, 0, 0, 0])
            .jitters([0])
            .chances([true, true, true])
            .fractions([0.0, 0.0, 0.0]);
        let curses = HashSet::new();
        let mut ctx = ActionContext {
            config: &config,
            now: t0(),
            rng: &mut rng,
            curses: &curses,
            lore: &NoMilestones,
        };
        let hp_before = c.stats().current_hp();
        let outcome = BattleAction.execute(&mut c, &mut ctx).unwrap();

        let elite = outcome.elite.as_ref().expect("elite encounter");
        assert!(elite.withdrew);
        assert!(!outcome.success);
        assert_eq!(outcome.xp_gained, 0);
        assert!(outcome.damage_taken >= 1);
        assert!(c.stats().current_hp() < hp_before);
        assert_eq!(c.enemies_killed(), 0);
    }
}
