//! Test utilities: a scripted randomness source for forcing exact outcomes.
//!
//! Actions document their draw order; a test queues just the draws it cares
//! about and the defaults cover the rest (rolls and jitters fall to zero,
//! chances to false, fractions to zero).

use std::collections::VecDeque;

use crate::rng::Randomizer;

/// A [`Randomizer`] that replays queued values instead of rolling.
#[derive(Debug, Default)]
pub struct ScriptedRng {
    rolls: VecDeque<u32>,
    jitters: VecDeque<i32>,
    chances: VecDeque<bool>,
    fractions: VecDeque<f64>,
}

impl ScriptedRng {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues values returned by `roll`, in order.
    pub fn rolls(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(values);
        self
    }

    /// Queues values returned by `jitter`, in order.
    pub fn jitters(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.jitters.extend(values);
        self
    }

    /// Queues values returned by `chance`, in order.
    pub fn chances(mut self, values: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(values);
        self
    }

    /// Queues values returned by `fraction`, in order.
    pub fn fractions(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.fractions.extend(values);
        self
    }
}

impl Randomizer for ScriptedRng {
    fn roll(&mut self, bound: u32) -> u32 {
        let value = self.rolls.pop_front().unwrap_or(0);
        if bound == 0 {
            0
        } else {
            value.min(bound - 1)
        }
    }

    fn jitter(&mut self, lo: i32, hi: i32) -> i32 {
        self.jitters.pop_front().unwrap_or(0).clamp(lo, hi)
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn fraction(&mut self) -> f64 {
        self.fractions.pop_front().unwrap_or(0.0)
    }
}
