//! Rest: full HP restoration, no XP.

use super::{Action, ActionContext};
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::rng::pick;
use crate::world::Character;

const NARRATIVES: &[&str] = &[
    "You rest beside a glowing icefire brazier, warmth soaking in slowly.",
    "You sleep beneath the twin moons and dream of old battles.",
    "You soak your wounds at a spring that never freezes.",
    "You meditate while the wind combs the tundra flat.",
    "You nap in an abandoned hut that turns out to be surprisingly cozy.",
    "You share tea with a passing traveler; the blend tastes like summer.",
    "You curl into a pile of furs and let the blizzard talk itself out.",
    "You lean against a rune pillar that hums a low, mending note.",
    "You pray at a forgotten shrine and rise feeling lighter.",
    "You watch mist braid itself over a frozen lake until sleep takes you.",
];

/// Rest action: fully restores HP at the cost of one charge.
pub struct RestAction;

impl Action for RestAction {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn description(&self) -> &'static str {
        "Rest to fully restore your HP"
    }

    fn execute(
        &self,
        character: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        let narrative = (*pick(ctx.rng, NARRATIVES)).to_string();
        let hp_restored = character.stats_mut().full_heal();
        character.spend_charge(ctx.now)?;

        Ok(Outcome {
            narrative,
            hp_restored,
            success: true,
            ..Outcome::default()
        })
    }
}
