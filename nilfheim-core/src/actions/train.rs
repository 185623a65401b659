//! Train: guaranteed stat growth plus a modest XP award.

use super::{clouded_mind_xp, scale_xp, Action, ActionContext};
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::rng::pick;
use crate::world::{Character, StatKind};

const STRENGTH_NARRATIVES: &[&str] = &[
    "You haul glacier-split boulders up the switchbacks until dusk.",
    "You spar bare-handed with a patient troll who pulls no punches.",
    "You drag a sledge of iron ingots across the frozen lake.",
    "You hold a war-stance under a waterfall of snowmelt.",
    "You split heartwood logs until your arms ring like struck bells.",
    "You wrestle the training master and finally move him a full step.",
];

const AGILITY_NARRATIVES: &[&str] = &[
    "You run the rooftops of the old quarter without touching a tile twice.",
    "You weave between swinging training logs until they stop touching you.",
    "You chase a wind spirit through the pines and almost keep pace.",
    "You cross the rope bridge blindfolded, twice, then backwards.",
    "You practice drawing steel until the motion outruns thought.",
    "You dance the blade-step with a phantom partner until dawn.",
];

const INTELLIGENCE_NARRATIVES: &[&str] = &[
    "You decipher a page of pre-Shattering runes by candlelight.",
    "You rebuild a collapsed spell-lattice from memory alone.",
    "You debate theory with the archivist and concede only one point.",
    "You chart the drift of the twin moons against the old star tables.",
    "You solve the frost-mirror puzzle that guards the library stacks.",
    "You transcribe a fading scroll before the ink forgets itself.",
];

const LUCK_NARRATIVES: &[&str] = &[
    "You play dice with a trickster spirit and walk away even.",
    "You learn to read omens in the crack patterns of river ice.",
    "You pick the one safe path through the shifting moraine, twice.",
    "You find a fate-clover growing in a bootprint, and leave it be.",
    "You study the oracle's games until chance starts feeling like choice.",
    "You flip a coin a hundred times and call it right past all counting.",
];

fn narrative_pool(stat: StatKind) -> &'static [&'static str] {
    match stat {
        StatKind::Strength => STRENGTH_NARRATIVES,
        StatKind::Agility => AGILITY_NARRATIVES,
        StatKind::Intelligence => INTELLIGENCE_NARRATIVES,
        // Only the four trainable stats reach this table.
        _ => LUCK_NARRATIVES,
    }
}

/// Train action: +1..=3 to a random trainable stat and some XP.
pub struct TrainAction;

impl Action for TrainAction {
    fn name(&self) -> &'static str {
        "train"
    }

    fn description(&self) -> &'static str {
        "Train to improve a stat and gain experience"
    }

    fn execute(
        &self,
        character: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        let trainable = StatKind::trainable();
        let stat = *pick(ctx.rng, &trainable);
        let amount = ctx.rng.roll(3) + 1;
        character.stats_mut().increase(stat, amount);

        let base = 25 + 4 * character.level() as i64;
        let variance = ctx.rng.jitter(-7, 7) as i64;
        let raw = scale_xp(base + variance, ctx.config.xp_multiplier());
        let xp_gained = clouded_mind_xp(raw, raw, ctx.curses);

        let prefix = *pick(ctx.rng, narrative_pool(stat));
        let narrative = format!(
            "{prefix} Your {} improves by {amount} point{}.",
            stat.name(),
            if amount > 1 { "s" } else { "" }
        );

        let leveled_up = ctx.grant_xp(character, xp_gained);
        character.spend_charge(ctx.now)?;

        Ok(Outcome {
            narrative,
            xp_gained,
            leveled_up,
            stat_increased: Some((stat, amount)),
            success: true,
            ..Outcome::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuildConfig;
    use crate::lore::NoMilestones;
    use crate::testing::ScriptedRng;
    use crate::world::{CharacterClass, PlayerId};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    #[test]
    fn test_train_raises_a_stat() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut c = Character::new(PlayerId::from("p"), "Bryn", CharacterClass::Mage, now);
        let str_before = c.stats().strength();
        let config = GuildConfig::new("g");
        let curses = HashSet::new();
        // Stat index 0 (Strength), amount roll 2 -> +3.
        let mut rng = ScriptedRng::new().rolls([0, 2, 0]).jitters([0]);
        let mut ctx = ActionContext {
            config: &config,
            now,
            rng: &mut rng,
            curses: &curses,
            lore: &NoMilestones,
        };

        let outcome = TrainAction.execute(&mut c, &mut ctx).unwrap();
        assert_eq!(outcome.stat_increased, Some((StatKind::Strength, 3)));
        assert_eq!(c.stats().strength(), str_before + 3);
        // Level 1: 25 + 4 = 29 XP with no variance.
        assert_eq!(outcome.xp_gained, 29);
        assert_eq!(c.action_charges(), 2);
    }

    #[test]
    fn test_train_respects_xp_multiplier() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut c = Character::new(PlayerId::from("p"), "Bryn", CharacterClass::Mage, now);
        let mut config = GuildConfig::new("g");
        config.set_xp_multiplier(2.0).unwrap();
        let curses = HashSet::new();
        let mut rng = ScriptedRng::new().jitters([0]);
        let mut ctx = ActionContext {
            config: &config,
            now,
            rng: &mut rng,
            curses: &curses,
            lore: &NoMilestones,
        };

        let outcome = TrainAction.execute(&mut c, &mut ctx).unwrap();
        assert_eq!(outcome.xp_gained, 58);
    }
}
