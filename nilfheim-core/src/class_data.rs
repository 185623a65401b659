//! Per-class base stats and combat coefficients.
//!
//! Combat formulas never switch on the class name; they read this table.
//! Power is always `2 x primary + secondary`, so adding a class means adding
//! one entry here.

use crate::world::{CharacterClass, StatKind, Stats};

/// Static data for one class: starting attributes and the coefficients the
/// combat formulas consume.
pub struct ClassData {
    pub base_hp: u32,
    pub base_str: u32,
    pub base_agi: u32,
    pub base_int: u32,
    pub base_luck: u32,
    /// Stat doubled in the power formula.
    pub power_primary: StatKind,
    /// Stat added once in the power formula.
    pub power_secondary: StatKind,
    /// Multiplier on incoming battle damage (the Knight soaks 15%).
    pub damage_taken_factor: f64,
}

impl ClassData {
    /// Combat power: `2 x primary + secondary`.
    pub fn power(&self, stats: &Stats) -> u32 {
        2 * stats.get(self.power_primary) + stats.get(self.power_secondary)
    }
}

impl CharacterClass {
    pub fn data(&self) -> ClassData {
        match self {
            // Bruiser: high HP and Strength, luck-assisted strikes.
            CharacterClass::Warrior => ClassData {
                base_hp: 110,
                base_str: 17,
                base_agi: 8,
                base_int: 5,
                base_luck: 7,
                power_primary: StatKind::Strength,
                power_secondary: StatKind::Luck,
                damage_taken_factor: 1.0,
            },
            // Full tank: massive HP, reduced incoming damage.
            CharacterClass::Knight => ClassData {
                base_hp: 135,
                base_str: 13,
                base_agi: 6,
                base_int: 6,
                base_luck: 5,
                power_primary: StatKind::Strength,
                power_secondary: StatKind::Agility,
                damage_taken_factor: 0.85,
            },
            // Glass cannon.
            CharacterClass::Mage => ClassData {
                base_hp: 70,
                base_str: 5,
                base_agi: 7,
                base_int: 20,
                base_luck: 5,
                power_primary: StatKind::Intelligence,
                power_secondary: StatKind::Agility,
                damage_taken_factor: 1.0,
            },
            // Crit/dodge specialist.
            CharacterClass::Rogue => ClassData {
                base_hp: 85,
                base_str: 8,
                base_agi: 16,
                base_int: 7,
                base_luck: 12,
                power_primary: StatKind::Agility,
                power_secondary: StatKind::Strength,
                damage_taken_factor: 1.0,
            },
            // Mage/Rogue hybrid riding INT and LUCK.
            CharacterClass::Necromancer => ClassData {
                base_hp: 75,
                base_str: 6,
                base_agi: 10,
                base_int: 15,
                base_luck: 10,
                power_primary: StatKind::Intelligence,
                power_secondary: StatKind::Luck,
                damage_taken_factor: 1.0,
            },
            // Support: healing and resurrection.
            CharacterClass::Priest => ClassData {
                base_hp: 90,
                base_str: 5,
                base_agi: 6,
                base_int: 15,
                base_luck: 10,
                power_primary: StatKind::Intelligence,
                power_secondary: StatKind::Agility,
                damage_taken_factor: 1.0,
            },
            // Fallen knight feeding on corruption.
            CharacterClass::Oathbreaker => ClassData {
                base_hp: 100,
                base_str: 15,
                base_agi: 7,
                base_int: 6,
                base_luck: 10,
                power_primary: StatKind::Strength,
                power_secondary: StatKind::Luck,
                damage_taken_factor: 1.0,
            },
        }
    }

    /// Starting stat block for a fresh character.
    pub fn base_stats(&self) -> Stats {
        let data = self.data();
        Stats::new(
            data.base_hp,
            data.base_str,
            data.base_agi,
            data.base_int,
            data.base_luck,
        )
    }

    /// Combat power for the given stat block.
    pub fn power(&self, stats: &Stats) -> u32 {
        self.data().power(stats)
    }

    pub fn description(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "A relentless melee bruiser with endurance to spare",
            CharacterClass::Knight => "An armored bulwark that shrugs off punishment",
            CharacterClass::Mage => "A fragile arcanist with overwhelming spellpower",
            CharacterClass::Rogue => "A swift skirmisher trading armor for precision",
            CharacterClass::Necromancer => "A dark hybrid weaving decay and fortune",
            CharacterClass::Priest => "A healer who can call the dead back to life",
            CharacterClass::Oathbreaker => "A fallen knight whose broken vow feeds his blade",
        }
    }
}
