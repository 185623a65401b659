//! Static content tables: the enemy roster, boss and super-boss catalogs,
//! and elite traits.
//!
//! Loaded once at process start and never mutated. Actions only read from
//! these tables; instancing formulas live next to the types they build.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::rng::{pick, Randomizer};
use crate::world::StatKind;

// ============================================================================
// Enemies
// ============================================================================

/// Broad enemy archetypes for the regular battle roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    Physical,
    Magical,
    Agile,
    Undead,
    Beast,
    Construct,
}

impl EnemyType {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyType::Physical => "Physical",
            EnemyType::Magical => "Magical",
            EnemyType::Agile => "Agile",
            EnemyType::Undead => "Undead",
            EnemyType::Beast => "Beast",
            EnemyType::Construct => "Construct",
        }
    }
}

/// One entry in the regular enemy roster.
#[derive(Debug, Clone, Copy)]
pub struct EnemyEntry {
    pub name: &'static str,
    pub kind: EnemyType,
}

const fn enemy(name: &'static str, kind: EnemyType) -> EnemyEntry {
    EnemyEntry { name, kind }
}

/// The regular battle roster.
pub const ENEMIES: &[EnemyEntry] = &[
    enemy("Goblin Scout", EnemyType::Physical),
    enemy("Bandit Thief", EnemyType::Physical),
    enemy("Orc Berserker", EnemyType::Physical),
    enemy("Corrupted Knight", EnemyType::Physical),
    enemy("Forest Troll", EnemyType::Physical),
    enemy("Frost Troll", EnemyType::Physical),
    enemy("Marauder", EnemyType::Physical),
    enemy("Possessed Armor", EnemyType::Physical),
    enemy("Dark Mage", EnemyType::Magical),
    enemy("Necromancer", EnemyType::Magical),
    enemy("Fire Elemental", EnemyType::Magical),
    enemy("Ice Golem", EnemyType::Magical),
    enemy("Wailing Wisp", EnemyType::Magical),
    enemy("Frostbound Sorcerer", EnemyType::Magical),
    enemy("Shrieking Banshee", EnemyType::Magical),
    enemy("Shadow Assassin", EnemyType::Agile),
    enemy("Venomous Spider", EnemyType::Agile),
    enemy("Dire Bat", EnemyType::Agile),
    enemy("Storm Raven", EnemyType::Agile),
    enemy("Frostfang Lynx", EnemyType::Agile),
    enemy("Blade Phantom", EnemyType::Agile),
    enemy("Skeleton Warrior", EnemyType::Undead),
    enemy("Wandering Revenant", EnemyType::Undead),
    enemy("Frozen Ghoul", EnemyType::Undead),
    enemy("Grave Wight", EnemyType::Undead),
    enemy("Frozen Lich", EnemyType::Undead),
    enemy("Wild Wolf", EnemyType::Beast),
    enemy("Frost-Bitten Bear", EnemyType::Beast),
    enemy("Enraged Wendigo", EnemyType::Beast),
    enemy("Dragon Whelp", EnemyType::Beast),
    enemy("Demon Imp", EnemyType::Beast),
    enemy("Tundra Beast", EnemyType::Beast),
    enemy("Slime Monster", EnemyType::Construct),
    enemy("Snow Golem", EnemyType::Construct),
    enemy("Crystal Guardian", EnemyType::Construct),
    enemy("Ice Sentinel", EnemyType::Construct),
];

// ============================================================================
// Elite traits
// ============================================================================

/// Combat-modifying traits an elite enemy can carry (one or two per elite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliteTrait {
    FrostHardened,
    SavagePackLeader,
    RuneTouched,
    BloodFrenzied,
    UnstableEssence,
    ShadowBound,
    VoidWhisperer,
    Ironclad,
    CursedBlood,
    AncientWard,
}

impl EliteTrait {
    pub fn name(&self) -> &'static str {
        match self {
            EliteTrait::FrostHardened => "Frost-Hardened",
            EliteTrait::SavagePackLeader => "Savage Pack Leader",
            EliteTrait::RuneTouched => "Rune-Touched",
            EliteTrait::BloodFrenzied => "Blood Frenzied",
            EliteTrait::UnstableEssence => "Unstable Essence",
            EliteTrait::ShadowBound => "Shadow-Bound",
            EliteTrait::VoidWhisperer => "Void Whisperer",
            EliteTrait::Ironclad => "Ironclad",
            EliteTrait::CursedBlood => "Cursed Blood",
            EliteTrait::AncientWard => "Ancient Ward",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EliteTrait::FrostHardened => "Ancient ice encases its hide, turning aside heavy blows.",
            EliteTrait::SavagePackLeader => "It leads with overwhelming ferocity and strikes first.",
            EliteTrait::RuneTouched => "Shimmering runes dampen incoming spellwork.",
            EliteTrait::BloodFrenzied => "Its rage sharpens as its wounds mount.",
            EliteTrait::UnstableEssence => "Its essence is volatile and detonates on death.",
            EliteTrait::ShadowBound => "Wrapped in shadow, it slips away from precise strikes.",
            EliteTrait::VoidWhisperer => "Void energy both feeds and resists magic around it.",
            EliteTrait::Ironclad => "Layered plating renders weapon blows nearly useless.",
            EliteTrait::CursedBlood => "Dark magic in its veins empowers every attack.",
            EliteTrait::AncientWard => "An old protective ward blunts every kind of assault.",
        }
    }

    /// Multiplier applied to the player's power, keyed on the attacking
    /// stat from the class capability table.
    pub fn player_power_factor(&self, attack_stat: StatKind) -> f64 {
        match self {
            EliteTrait::FrostHardened if attack_stat == StatKind::Strength => 0.85,
            EliteTrait::Ironclad if attack_stat == StatKind::Strength => 0.80,
            EliteTrait::RuneTouched if attack_stat == StatKind::Intelligence => 0.90,
            EliteTrait::ShadowBound if attack_stat == StatKind::Agility => 0.90,
            EliteTrait::VoidWhisperer if attack_stat == StatKind::Intelligence => 1.05,
            EliteTrait::AncientWard => 0.85,
            _ => 1.0,
        }
    }

    /// Multiplier applied to the elite's damage side.
    pub fn enemy_damage_factor(&self) -> f64 {
        match self {
            EliteTrait::BloodFrenzied => 1.10,
            EliteTrait::CursedBlood => 1.05,
            _ => 1.0,
        }
    }

    /// Unstable essences detonate when the elite dies.
    pub fn explodes_on_death(&self) -> bool {
        matches!(self, EliteTrait::UnstableEssence)
    }

    pub fn all() -> &'static [EliteTrait] {
        &[
            EliteTrait::FrostHardened,
            EliteTrait::SavagePackLeader,
            EliteTrait::RuneTouched,
            EliteTrait::BloodFrenzied,
            EliteTrait::UnstableEssence,
            EliteTrait::ShadowBound,
            EliteTrait::VoidWhisperer,
            EliteTrait::Ironclad,
            EliteTrait::CursedBlood,
            EliteTrait::AncientWard,
        ]
    }
}

impl fmt::Display for EliteTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Bosses
// ============================================================================

/// Boss archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossType {
    Beast,
    Giant,
    Undead,
    Spirit,
    Elemental,
    Humanoid,
    Eldritch,
    Construct,
    Dragon,
    Demon,
}

impl BossType {
    pub fn name(&self) -> &'static str {
        match self {
            BossType::Beast => "Beast",
            BossType::Giant => "Giant",
            BossType::Undead => "Undead",
            BossType::Spirit => "Spirit",
            BossType::Elemental => "Elemental",
            BossType::Humanoid => "Humanoid",
            BossType::Eldritch => "Eldritch",
            BossType::Construct => "Construct",
            BossType::Dragon => "Dragon",
            BossType::Demon => "Demon",
        }
    }
}

/// A fixed (name, type, lore) catalog tuple.
#[derive(Debug, Clone, Copy)]
pub struct BossEntry {
    pub name: &'static str,
    pub kind: BossType,
    pub lore: &'static str,
}

/// A super-boss catalog tuple; carries an extra flavor mechanic line.
#[derive(Debug, Clone, Copy)]
pub struct SuperBossEntry {
    pub name: &'static str,
    pub kind: BossType,
    pub lore: &'static str,
    pub mechanic: &'static str,
}

const fn boss(name: &'static str, kind: BossType, lore: &'static str) -> BossEntry {
    BossEntry { name, kind, lore }
}

lazy_static! {
    /// Normal bosses, two per level for levels 1-12.
    pub static ref NORMAL_BOSSES: HashMap<u32, Vec<BossEntry>> = {
        let mut table = HashMap::new();
        table.insert(1, vec![
            boss("Frostbitten Troll", BossType::Beast,
                "A sluggish brute whose roar rattles the snowfields."),
            boss("Spirit Wisp Horror", BossType::Spirit,
                "Lost souls knotted together by bitterness and moonlight."),
        ]);
        table.insert(2, vec![
            boss("Bonegnasher Ghoul", BossType::Undead,
                "A ghoul of unnatural cunning that commands its pack alone."),
            boss("Frostfang Direwolf", BossType::Beast,
                "Its howl freezes blood and courage alike."),
        ]);
        table.insert(3, vec![
            boss("Iceborne Sorcerer", BossType::Humanoid,
                "A warlock whose soul fused with an ancient glacier."),
            boss("Corpse Stitcher", BossType::Undead,
                "A surgeon of death who sews abominations from fallen heroes."),
        ]);
        table.insert(4, vec![
            boss("Shadowblade Assassin", BossType::Humanoid,
                "A killer whose blades hunt for renown in the dark."),
            boss("Void-Touched Servitor", BossType::Eldritch,
                "A servant of the deep void that speaks in fractal whispers."),
        ]);
        table.insert(5, vec![
            boss("Frost Titan", BossType::Giant,
                "A walking mountain of ice; its footsteps start avalanches."),
            boss("Eternal Frost Witch", BossType::Humanoid,
                "Her heart froze a century ago, but her hatred burns on."),
        ]);
        table.insert(6, vec![
            boss("Crypt Sovereign", BossType::Undead,
                "Ruler of the burial vaults beneath the tundra."),
            boss("Stormborn Gryphon", BossType::Beast,
                "A predator forged in the heart of lightning storms."),
        ]);
        table.insert(7, vec![
            boss("Plague Herald", BossType::Demon,
                "Bringer of pestilence, whisperer of corruption."),
            boss("Shiverheart Basilisk", BossType::Beast,
                "Its gaze freezes flesh and courage in equal measure."),
        ]);
        table.insert(8, vec![
            boss("Ironhide Juggernaut", BossType::Construct,
                "An unstoppable machine of forgotten origin."),
            boss("Riftbreaker Harpy", BossType::Beast,
                "A winged terror whose scream can crack sanity."),
        ]);
        table.insert(9, vec![
            boss("Frostwraith Matriarch", BossType::Spirit,
                "A mother-wraith mourning children lost long ago."),
            boss("Dreadhorn Minotaur", BossType::Beast,
                "A labyrinth warden shaped from icy rage."),
        ]);
        table.insert(10, vec![
            boss("Polar Hydra", BossType::Dragon,
                "Three snapping heads around one frozen heart."),
            boss("Soulflayer Acolyte", BossType::Humanoid,
                "It feeds the souls of heroes to a hungry god."),
        ]);
        table.insert(11, vec![
            boss("Ashen Revenant", BossType::Undead,
                "A hero resurrected and twisted by regret."),
            boss("Crystalbound Dragonspawn", BossType::Dragon,
                "Shards of an ancient dragon reforged by frozen magic."),
        ]);
        table.insert(12, vec![
            boss("The Rime Executioner", BossType::Humanoid,
                "A sentient suit of armor worn by an ice spirit."),
            boss("Warden of the Shattered Gate", BossType::Eldritch,
                "It watches a forgotten portal that opens onto nothing."),
        ]);
        table
    };

    /// Super bosses, indexed by level (1-based).
    pub static ref SUPER_BOSSES: Vec<SuperBossEntry> = vec![
        SuperBossEntry { name: "Ymir the Winterbound Colossus", kind: BossType::Giant,
            lore: "Said to be the first creature to walk the tundra.",
            mechanic: "Unleashes an avalanche crash at every fifth of its health." },
        SuperBossEntry { name: "Skorn, Devourer of Hope", kind: BossType::Demon,
            lore: "Its mere presence snuffs out courage.",
            mechanic: "Steals health from the fiercest attacker each round." },
        SuperBossEntry { name: "Vespera, Queen of Frostwraiths", kind: BossType::Spirit,
            lore: "Mother of spirits, draped in sorrow and moonlight.",
            mechanic: "So elusive that many attacks simply miss." },
        SuperBossEntry { name: "The Eternal Maw", kind: BossType::Eldritch,
            lore: "A floating, many-jawed void creature that feeds endlessly.",
            mechanic: "Half of all damage dealt to it arrives late." },
        SuperBossEntry { name: "Draugr King Halrom", kind: BossType::Undead,
            lore: "Once a beloved ruler; now a tyrant of the dead.",
            mechanic: "Calls spectral guards to its side." },
        SuperBossEntry { name: "Stormlord Valkyrios", kind: BossType::Dragon,
            lore: "A dragon that embodies the storm's will.",
            mechanic: "Lightning lashes everyone who dares attack." },
        SuperBossEntry { name: "The Obsidian Reaper", kind: BossType::Construct,
            lore: "A reaper forged from cursed metal.",
            mechanic: "Reflects a sliver of every wound back at its attackers." },
        SuperBossEntry { name: "Nidhollow Serpent", kind: BossType::Eldritch,
            lore: "It coils through the void beneath the world.",
            mechanic: "Can swallow an attacker whole, if briefly." },
        SuperBossEntry { name: "Bloodmoon Matron", kind: BossType::Demon,
            lore: "On bloodmoon nights she hunts for heroes' hearts.",
            mechanic: "Heals from the total damage brought against her." },
        SuperBossEntry { name: "The Rune-Eater Behemoth", kind: BossType::Construct,
            lore: "It consumes magic itself until nothing can stop it.",
            mechanic: "Dampens all spell-borne damage." },
        SuperBossEntry { name: "Frostwind Chimera", kind: BossType::Beast,
            lore: "Lion, ram and serpent fused by cursed magic.",
            mechanic: "Strikes with a different element every round." },
        SuperBossEntry { name: "Kalgorath, Harbinger of the Void Star", kind: BossType::Eldritch,
            lore: "A cosmic destroyer drawn to the world's suffering.",
            mechanic: "Grows more violent at each quarter of its health." },
    ];
}

/// Bosses and super bosses despawn this long after spawning, engaged or not.
pub const BOSS_LIFETIME_HOURS: i64 = 24;

/// Highest normal-boss level in the catalog.
pub const MAX_NORMAL_BOSS_LEVEL: u32 = 12;

/// Derives the deterministic instance id for a boss name and level, so a
/// given (name, level) pair always resolves to the same identity.
fn instance_id(prefix: &str, name: &str, level: u32) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{prefix}_{slug}_{level}")
}

/// A spawned normal boss. `max_hp = 10000 x level`, `attack = 50 + 20 x level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: String,
    pub name: String,
    pub kind: BossType,
    pub level: u32,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    pub lore: String,
    pub spawned_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub defeated: bool,
}

impl Boss {
    /// Instantiates a random boss for the level (clamped into the catalog's
    /// 1..=12 range).
    pub fn spawn(level: u32, rng: &mut dyn Randomizer, now: DateTime<Utc>) -> Boss {
        let level = level.clamp(1, MAX_NORMAL_BOSS_LEVEL);
        let entry = pick(rng, &NORMAL_BOSSES[&level]);
        Boss::from_entry(entry, level, now)
    }

    pub fn from_entry(entry: &BossEntry, level: u32, now: DateTime<Utc>) -> Boss {
        let max_hp = 10_000 * level;
        Boss {
            id: instance_id("boss", entry.name, level),
            name: entry.name.to_string(),
            kind: entry.kind,
            level,
            max_hp,
            current_hp: max_hp,
            attack: 50 + 20 * level,
            lore: entry.lore.to_string(),
            spawned_at: now,
            expires_at: now + Duration::hours(BOSS_LIFETIME_HOURS),
            defeated: false,
        }
    }

    /// Applies damage; returns whether this blow defeated the boss.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        self.current_hp = self.current_hp.saturating_sub(damage);
        if self.current_hp == 0 {
            self.defeated = true;
        }
        self.defeated
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A spawned super boss. `max_hp = 50000 x level`, `attack = 200 + 50 x level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperBoss {
    pub id: String,
    pub name: String,
    pub kind: BossType,
    pub level: u32,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    pub lore: String,
    pub mechanic: String,
    pub spawned_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub defeated: bool,
}

impl SuperBoss {
    /// Instantiates the super boss for the level; levels beyond the catalog
    /// reuse its final entry.
    pub fn spawn(level: u32, now: DateTime<Utc>) -> SuperBoss {
        let level = level.max(1);
        let index = (level as usize - 1).min(SUPER_BOSSES.len() - 1);
        let entry = &SUPER_BOSSES[index];
        let max_hp = 50_000 * level;
        SuperBoss {
            id: instance_id("superboss", entry.name, level),
            name: entry.name.to_string(),
            kind: entry.kind,
            level,
            max_hp,
            current_hp: max_hp,
            attack: 200 + 50 * level,
            lore: entry.lore.to_string(),
            mechanic: entry.mechanic.to_string(),
            spawned_at: now,
            expires_at: now + Duration::hours(BOSS_LIFETIME_HOURS),
            defeated: false,
        }
    }

    pub fn take_damage(&mut self, damage: u32) -> bool {
        self.current_hp = self.current_hp.saturating_sub(damage);
        if self.current_hp == 0 {
            self.defeated = true;
        }
        self.defeated
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
