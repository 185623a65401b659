//! Explore: wander the frozen wilds for XP and the occasional essence.

use super::{clouded_mind_xp, scale_xp, Action, ActionContext};
use crate::error::EngineError;
use crate::inventory::EssenceKind;
use crate::outcome::Outcome;
use crate::rng::pick;
use crate::world::Character;

/// Base chance to find essences while exploring.
const BASE_FIND_CHANCE: f64 = 0.125;

/// Each point of agility adds 0.5 %, up to +15 %.
const AGILITY_FIND_BONUS_PER_POINT: f64 = 0.005;
const AGILITY_FIND_BONUS_CAP: f64 = 0.15;

const NARRATIVES: &[&str] = &[
    "You follow a frozen riverbed to a cave mouth breathing warm air.",
    "You cross a field of standing stones, each humming a different note.",
    "You track strange prints through fresh snow until they simply stop.",
    "You climb a ridge and watch the twin moons rise over the tundra.",
    "You find the remains of a caravan, long picked over by scavengers.",
    "You shelter from a sudden squall inside a hollow, rune-carved trunk.",
    "You map a shortcut through the ice caves that few have survived.",
    "You barter stories with a wandering peddler beside a dying fire.",
    "You discover a hot spring ringed by flowers that bloom through frost.",
    "You scout the edge of the Spirit Veil, careful not to step across.",
];

/// Explore action. Grants XP with mild variance and sometimes essences.
pub struct ExploreAction;

impl Action for ExploreAction {
    fn name(&self) -> &'static str {
        "explore"
    }

    fn description(&self) -> &'static str {
        "Explore the wilds for experience and essences"
    }

    fn execute(
        &self,
        character: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        let narrative = (*pick(ctx.rng, NARRATIVES)).to_string();

        let base = 30 + 5 * character.level() as i64;
        let variance = ctx.rng.jitter(-10, 10) as i64;
        let raw = scale_xp(base + variance, ctx.config.xp_multiplier());
        let xp_gained = clouded_mind_xp(raw, raw, ctx.curses);

        let agility_bonus =
            (character.stats().agility() as f64 * AGILITY_FIND_BONUS_PER_POINT).min(AGILITY_FIND_BONUS_CAP);
        let find_chance = BASE_FIND_CHANCE + agility_bonus;

        let mut essence_drops = Vec::new();
        if ctx.rng.chance(find_chance) {
            let count = ctx.rng.roll(2) + 1;
            let essence = *pick(ctx.rng, &EssenceKind::all());
            character.inventory_mut().add_essence(essence, count);
            essence_drops.push((essence, count));
        }

        let leveled_up = ctx.grant_xp(character, xp_gained);
        character.spend_charge(ctx.now)?;

        Ok(Outcome {
            narrative,
            xp_gained,
            leveled_up,
            success: true,
            essence_drops,
            ..Outcome::default()
        })
    }
}
