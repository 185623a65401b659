//! Duels: friendly PvP with no HP or XP stakes, just bragging rights.
//!
//! Power mirrors the battle formula plus a luck bonus and a symmetric
//! jitter per side. The record and the rolling 24-hour rate limit live on
//! the characters themselves.

use super::ActionContext;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::world::{Character, CharacterClass, MAX_DUELS_PER_DAY};

/// Duel engine. The service locks both characters (in key order) before
/// calling in.
pub struct DuelEngine;

impl DuelEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn execute_duel(
        &self,
        challenger: &mut Character,
        target: &mut Character,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Outcome, EngineError> {
        if !challenger.can_duel(ctx.now) {
            return Err(EngineError::ResourceExhausted(format!(
                "{} has already fought {MAX_DUELS_PER_DAY} duels in the last 24 hours",
                challenger.name()
            )));
        }
        if !target.can_duel(ctx.now) {
            return Err(EngineError::ResourceExhausted(format!(
                "{} cannot accept another duel right now",
                target.name()
            )));
        }

        let challenger_roll = duel_power(challenger) + ctx.rng.jitter(-10, 9) as i64;
        let target_roll = duel_power(target) + ctx.rng.jitter(-10, 9) as i64;
        // Ties go to the defender.
        let challenger_wins = challenger_roll > target_roll;

        challenger.record_duel(challenger_wins, ctx.now);
        target.record_duel(!challenger_wins, ctx.now);

        let (winner, loser) = if challenger_wins {
            (&*challenger, &*target)
        } else {
            (&*target, &*challenger)
        };
        let narrative = matchup_line(winner.class(), loser.class(), winner.name(), loser.name());

        Ok(Outcome {
            narrative,
            success: challenger_wins,
            ..Outcome::default()
        })
    }
}

impl Default for DuelEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Class power plus the duel luck bonus.
fn duel_power(character: &Character) -> i64 {
    character.class().power(character.stats()) as i64 + 2 * character.stats().luck() as i64
}

/// Asymmetric class-vs-class flavor for the winner's side.
fn matchup_line(
    winner: CharacterClass,
    loser: CharacterClass,
    winner_name: &str,
    loser_name: &str,
) -> String {
    use CharacterClass::*;
    let line = match (winner, loser) {
        (Warrior, Mage | Necromancer | Priest) => {
            "{w}'s relentless assault crashed straight through {l}'s wards: steel beats sorcery today."
        }
        (Warrior, Rogue) => {
            "{w}'s heavy strikes found their mark despite {l}'s footwork; raw power outlasted speed."
        }
        (Warrior, Knight | Warrior | Oathbreaker) => {
            "{w} and {l} traded hammering blows until only {w} still stood."
        }
        (Knight, Warrior | Oathbreaker) => {
            "{w}'s shield weathered everything {l} could throw before the counterblow landed."
        }
        (Knight, Mage | Necromancer | Priest) => {
            "Spell after spell broke against {w}'s armor until {l} had nothing left."
        }
        (Knight, Rogue) => "{w} gave {l}'s blades nothing but shield and answered with iron.",
        (Knight, Knight) => "Two walls of iron ground against each other; {w}'s held longer than {l}'s.",
        (Mage, Warrior | Knight | Oathbreaker) => {
            "{w} kept {l} at arm's length behind a storm of arcane fire."
        }
        (Mage, Rogue) => "{w}'s barriers turned {l}'s quickest strikes into glancing taps.",
        (Mage, Mage | Necromancer | Priest) => {
            "A battle of pure theory: {w}'s arcana out-argued {l}'s."
        }
        (Rogue, Warrior | Knight | Oathbreaker) => {
            "{w} was simply never where {l} swung, and every miss cost {l} dearly."
        }
        (Rogue, Mage | Necromancer | Priest) => {
            "{w} closed the distance before {l} finished the first syllable of a spell."
        }
        (Rogue, Rogue) => "Two shadows dueled in silence; {w}'s blade whispered last against {l}.",
        (Necromancer, Warrior | Knight | Oathbreaker) => {
            "Decay crept through {l}'s guard until {w} barely needed the finishing touch."
        }
        (Necromancer, Mage | Priest) => {
            "{w}'s dark arts and darker luck unraveled {l}'s brightest magic."
        }
        (Necromancer, Rogue | Necromancer) => {
            "{w} let withering hexes do the chasing that {l}'s speed demanded."
        }
        (Priest, Warrior | Knight | Oathbreaker) => {
            "{w}'s patient wards outlasted {l}'s fury, and light had the final word."
        }
        (Priest, Mage | Necromancer) => "Divine clarity cut through {l}'s weave; {w} prevailed.",
        (Priest, Rogue | Priest) => "{w}'s serenity never cracked, and {l}'s aggression spent itself.",
        (Oathbreaker, Mage | Necromancer | Priest) => {
            "{w}'s broken oath drank {l}'s magic and asked for more."
        }
        (Oathbreaker, Rogue) => {
            "{w} took {l}'s best cut and answered with corrupted strength."
        }
        (Oathbreaker, _) => {
            "{w} fought like something with nothing left to lose, and {l} blinked first."
        }
    };
    line.replace("{w}", winner_name).replace("{l}", loser_name)
}
