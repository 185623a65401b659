//! Structured, narrator-agnostic description of what an action did.
//!
//! Produced once per invocation and never mutated afterwards; the
//! presentation layer turns it into whatever the chat surface needs.

use serde::{Deserialize, Serialize};

use crate::catalog::EliteTrait;
use crate::inventory::{CatalystKind, EssenceKind};
use crate::world::StatKind;

/// Elite-encounter details attached to a battle outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliteEncounter {
    pub traits: Vec<EliteTrait>,
    /// The character slipped away before the fight started.
    pub withdrew: bool,
}

/// What one action invocation did to the world.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Outcome {
    pub narrative: String,
    pub xp_gained: u64,
    pub leveled_up: bool,
    pub stat_increased: Option<(StatKind, u32)>,
    pub damage_taken: u32,
    pub hp_restored: u32,
    pub success: bool,
    pub essence_drops: Vec<(EssenceKind, u32)>,
    pub catalyst_drops: Vec<(CatalystKind, u32)>,
    pub elite: Option<EliteEncounter>,
}

impl Outcome {
    /// A successful outcome carrying only narrative.
    pub fn narrative_only(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            success: true,
            ..Self::default()
        }
    }

    pub fn is_elite_encounter(&self) -> bool {
        self.elite.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_only_defaults() {
        let outcome = Outcome::narrative_only("a quiet day");
        assert!(outcome.success);
        assert_eq!(outcome.xp_gained, 0);
        assert_eq!(outcome.damage_taken, 0);
        assert!(outcome.essence_drops.is_empty());
        assert!(!outcome.is_elite_encounter());
    }
}
