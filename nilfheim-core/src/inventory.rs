//! Counted crafting resources and the permanent bonuses crafted from them.
//!
//! Essences drop from battles and exploration, catalysts from elite kills.
//! Consuming both through a recipe buys a permanent stat bonus, hard-capped
//! at 5 per stat no matter how much material is on hand.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::world::StatKind;

/// Hard cap on the crafted bonus per stat.
pub const MAX_CRAFTED_BONUS_PER_STAT: u32 = 5;

/// Essence kinds, each aligned with one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EssenceKind {
    EmberShard,
    GaleFragment,
    MindCrystal,
    FateClover,
    VitalAsh,
}

impl EssenceKind {
    pub fn name(&self) -> &'static str {
        match self {
            EssenceKind::EmberShard => "Ember Shard",
            EssenceKind::GaleFragment => "Gale Fragment",
            EssenceKind::MindCrystal => "Mind Crystal",
            EssenceKind::FateClover => "Fate Clover",
            EssenceKind::VitalAsh => "Vital Ash",
        }
    }

    pub fn stat_alignment(&self) -> StatKind {
        match self {
            EssenceKind::EmberShard => StatKind::Strength,
            EssenceKind::GaleFragment => StatKind::Agility,
            EssenceKind::MindCrystal => StatKind::Intelligence,
            EssenceKind::FateClover => StatKind::Luck,
            EssenceKind::VitalAsh => StatKind::Hp,
        }
    }

    pub fn all() -> [EssenceKind; 5] {
        [
            EssenceKind::EmberShard,
            EssenceKind::GaleFragment,
            EssenceKind::MindCrystal,
            EssenceKind::FateClover,
            EssenceKind::VitalAsh,
        ]
    }
}

impl fmt::Display for EssenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Catalyst kinds. Rarer than essences; every recipe needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalystKind {
    AncientVial,
    RunicBinding,
    MonsterCore,
    FrozenReagent,
}

impl CatalystKind {
    pub fn name(&self) -> &'static str {
        match self {
            CatalystKind::AncientVial => "Ancient Vial",
            CatalystKind::RunicBinding => "Runic Binding",
            CatalystKind::MonsterCore => "Monster Core",
            CatalystKind::FrozenReagent => "Frozen Reagent",
        }
    }

    pub fn all() -> [CatalystKind; 4] {
        [
            CatalystKind::AncientVial,
            CatalystKind::RunicBinding,
            CatalystKind::MonsterCore,
            CatalystKind::FrozenReagent,
        ]
    }
}

impl fmt::Display for CatalystKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Craftable items granting permanent stat bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CraftedItem {
    EmberInfusion,
    GaleEtching,
    MindSigil,
    CharmOfFortune,
    VitalRune,
}

impl CraftedItem {
    pub fn name(&self) -> &'static str {
        match self {
            CraftedItem::EmberInfusion => "Ember Infusion",
            CraftedItem::GaleEtching => "Gale Etching",
            CraftedItem::MindSigil => "Mind Sigil",
            CraftedItem::CharmOfFortune => "Charm of Fortune",
            CraftedItem::VitalRune => "Vital Rune",
        }
    }

    pub fn essence(&self) -> EssenceKind {
        match self {
            CraftedItem::EmberInfusion => EssenceKind::EmberShard,
            CraftedItem::GaleEtching => EssenceKind::GaleFragment,
            CraftedItem::MindSigil => EssenceKind::MindCrystal,
            CraftedItem::CharmOfFortune => EssenceKind::FateClover,
            CraftedItem::VitalRune => EssenceKind::VitalAsh,
        }
    }

    pub fn essence_cost(&self) -> u32 {
        match self {
            CraftedItem::EmberInfusion | CraftedItem::GaleEtching => 5,
            CraftedItem::MindSigil | CraftedItem::CharmOfFortune => 4,
            CraftedItem::VitalRune => 3,
        }
    }

    pub fn catalyst(&self) -> CatalystKind {
        match self {
            CraftedItem::EmberInfusion | CraftedItem::GaleEtching => CatalystKind::AncientVial,
            CraftedItem::MindSigil | CraftedItem::CharmOfFortune => CatalystKind::RunicBinding,
            CraftedItem::VitalRune => CatalystKind::MonsterCore,
        }
    }

    pub fn catalyst_cost(&self) -> u32 {
        1
    }

    pub fn stat(&self) -> StatKind {
        match self {
            CraftedItem::EmberInfusion => StatKind::Strength,
            CraftedItem::GaleEtching => StatKind::Agility,
            CraftedItem::MindSigil => StatKind::Intelligence,
            CraftedItem::CharmOfFortune => StatKind::Luck,
            CraftedItem::VitalRune => StatKind::Hp,
        }
    }

    /// Bonus granted per craft. HP runes grant a larger flat amount, but the
    /// bonus ledger still counts toward the per-stat cap one craft at a time.
    pub fn bonus(&self) -> u32 {
        match self {
            CraftedItem::VitalRune => 5,
            _ => 1,
        }
    }

    pub fn all() -> [CraftedItem; 5] {
        [
            CraftedItem::EmberInfusion,
            CraftedItem::GaleEtching,
            CraftedItem::MindSigil,
            CraftedItem::CharmOfFortune,
            CraftedItem::VitalRune,
        ]
    }
}

impl fmt::Display for CraftedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A character's counted resources and crafted-bonus ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    essences: HashMap<EssenceKind, u32>,
    catalysts: HashMap<CatalystKind, u32>,
    crafted_bonuses: HashMap<StatKind, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn essence_count(&self, kind: EssenceKind) -> u32 {
        self.essences.get(&kind).copied().unwrap_or(0)
    }

    pub fn catalyst_count(&self, kind: CatalystKind) -> u32 {
        self.catalysts.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_essence(&mut self, kind: EssenceKind, count: u32) {
        *self.essences.entry(kind).or_insert(0) += count;
    }

    pub fn add_catalyst(&mut self, kind: CatalystKind, count: u32) {
        *self.catalysts.entry(kind).or_insert(0) += count;
    }

    /// Removes essences; rejected without mutation when the count is short.
    pub fn remove_essence(&mut self, kind: EssenceKind, count: u32) -> Result<(), EngineError> {
        let held = self.essence_count(kind);
        if held < count {
            return Err(EngineError::InvariantViolation(format!(
                "cannot remove {count} {kind} (only {held} held)"
            )));
        }
        self.essences.insert(kind, held - count);
        Ok(())
    }

    /// Removes catalysts; rejected without mutation when the count is short.
    pub fn remove_catalyst(&mut self, kind: CatalystKind, count: u32) -> Result<(), EngineError> {
        let held = self.catalyst_count(kind);
        if held < count {
            return Err(EngineError::InvariantViolation(format!(
                "cannot remove {count} {kind} (only {held} held)"
            )));
        }
        self.catalysts.insert(kind, held - count);
        Ok(())
    }

    /// Crafted bonus currently applied to a stat (0..=5).
    pub fn crafted_bonus(&self, stat: StatKind) -> u32 {
        self.crafted_bonuses.get(&stat).copied().unwrap_or(0)
    }

    pub fn has_materials(&self, item: CraftedItem) -> bool {
        self.essence_count(item.essence()) >= item.essence_cost()
            && self.catalyst_count(item.catalyst()) >= item.catalyst_cost()
    }

    pub fn can_craft(&self, item: CraftedItem) -> bool {
        self.has_materials(item) && self.crafted_bonus(item.stat()) < MAX_CRAFTED_BONUS_PER_STAT
    }

    /// Consumes materials and applies the bonus. Missing materials are
    /// reported as exhaustion; a capped stat as an invariant violation. In
    /// both cases nothing is consumed.
    pub fn craft(&mut self, item: CraftedItem) -> Result<u32, EngineError> {
        if !self.has_materials(item) {
            return Err(EngineError::ResourceExhausted(format!(
                "not enough materials to craft {item}"
            )));
        }
        let current = self.crafted_bonus(item.stat());
        if current >= MAX_CRAFTED_BONUS_PER_STAT {
            return Err(EngineError::InvariantViolation(format!(
                "crafted bonus for {} is already at the cap",
                item.stat().name()
            )));
        }
        self.remove_essence(item.essence(), item.essence_cost())?;
        self.remove_catalyst(item.catalyst(), item.catalyst_cost())?;
        let applied = item.bonus().min(MAX_CRAFTED_BONUS_PER_STAT - current);
        self.crafted_bonuses.insert(item.stat(), current + applied);
        Ok(applied)
    }
}
