//! Core world types: player identity, stats, life-state and the character
//! aggregate.
//!
//! A [`Character`] owns one [`Stats`] block and one
//! [`Inventory`](crate::inventory::Inventory), and carries the action-charge
//! economy, leveling state and the life/death/recovery state machine. All
//! time-dependent transitions take `now` explicitly so they can be driven in
//! tests; nothing in this module reads the wall clock.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::inventory::Inventory;

// ============================================================================
// Identity
// ============================================================================

/// Stable external key for a player (one character per key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Stats
// ============================================================================

/// The five character attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Hp,
    Strength,
    Agility,
    Intelligence,
    Luck,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Strength => "Strength",
            StatKind::Agility => "Agility",
            StatKind::Intelligence => "Intelligence",
            StatKind::Luck => "Luck",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Strength => "STR",
            StatKind::Agility => "AGI",
            StatKind::Intelligence => "INT",
            StatKind::Luck => "LUCK",
        }
    }

    pub fn all() -> [StatKind; 5] {
        [
            StatKind::Hp,
            StatKind::Strength,
            StatKind::Agility,
            StatKind::Intelligence,
            StatKind::Luck,
        ]
    }

    /// The stats eligible for training (HP grows through leveling and
    /// crafting instead).
    pub fn trainable() -> [StatKind; 4] {
        [
            StatKind::Strength,
            StatKind::Agility,
            StatKind::Intelligence,
            StatKind::Luck,
        ]
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Raw numeric attributes. Monotonically non-decreasing except HP, which
/// fluctuates with damage and healing. `0 <= current_hp <= max_hp` always
/// holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    max_hp: u32,
    current_hp: u32,
    strength: u32,
    agility: u32,
    intelligence: u32,
    luck: u32,
}

impl Stats {
    pub fn new(max_hp: u32, strength: u32, agility: u32, intelligence: u32, luck: u32) -> Self {
        Self {
            max_hp,
            current_hp: max_hp,
            strength,
            agility,
            intelligence,
            luck,
        }
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn agility(&self) -> u32 {
        self.agility
    }

    pub fn intelligence(&self) -> u32 {
        self.intelligence
    }

    pub fn luck(&self) -> u32 {
        self.luck
    }

    /// Reads a stat by kind. `Hp` reads the maximum.
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Hp => self.max_hp,
            StatKind::Strength => self.strength,
            StatKind::Agility => self.agility,
            StatKind::Intelligence => self.intelligence,
            StatKind::Luck => self.luck,
        }
    }

    /// Permanently raises a stat. Raising HP grows both maximum and current.
    pub fn increase(&mut self, kind: StatKind, amount: u32) {
        match kind {
            StatKind::Hp => {
                self.max_hp += amount;
                self.current_hp += amount;
            }
            StatKind::Strength => self.strength += amount,
            StatKind::Agility => self.agility += amount,
            StatKind::Intelligence => self.intelligence += amount,
            StatKind::Luck => self.luck += amount,
        }
    }

    /// Flat per-level growth: +5 max HP with a full heal, +1 to the four
    /// combat stats.
    pub fn apply_level_growth(&mut self) {
        self.max_hp += 5;
        self.current_hp = self.max_hp;
        self.strength += 1;
        self.agility += 1;
        self.intelligence += 1;
        self.luck += 1;
    }

    /// Applies damage, clamping at zero. Returns whether the bearer is
    /// still standing.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp > 0
    }

    /// Restores HP up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Restores HP to full. Returns the amount restored.
    pub fn full_heal(&mut self) -> u32 {
        let before = self.current_hp;
        self.current_hp = self.max_hp;
        self.current_hp - before
    }

    /// Sets current HP, clamped to `[0, max_hp]`.
    pub fn set_current_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }
}

// ============================================================================
// Classes
// ============================================================================

/// The seven playable classes. Base stats and combat coefficients live in
/// [`crate::class_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Knight,
    Mage,
    Rogue,
    Necromancer,
    Priest,
    Oathbreaker,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Knight => "Knight",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Necromancer => "Necromancer",
            CharacterClass::Priest => "Priest",
            CharacterClass::Oathbreaker => "Oathbreaker",
        }
    }

    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Warrior,
            CharacterClass::Knight,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Necromancer,
            CharacterClass::Priest,
            CharacterClass::Oathbreaker,
        ]
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Life-state
// ============================================================================

/// Life-state machine: Alive -> Dead (HP hits 0) -> Recovering (resurrected
/// at half HP) -> Alive (deadline passes, resolved lazily on access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
    Recovering { until: DateTime<Utc> },
}

impl LifeState {
    pub fn name(&self) -> &'static str {
        match self {
            LifeState::Alive => "alive",
            LifeState::Dead => "dead",
            LifeState::Recovering { .. } => "recovering",
        }
    }

    /// Whether this state permits initiating charge-gated actions.
    pub fn can_act(&self) -> bool {
        matches!(self, LifeState::Alive)
    }
}

/// Marks a character carries from world encounters; consulted for narrative
/// flavor (resurrection in particular).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldFlag {
    StoneWolfMarked,
    FrostwindMarked,
    HollowMindMarked,
    AnchoredSoul,
    OathOfNull,
}

// ============================================================================
// Character
// ============================================================================

/// Charge capacity grows by one at each of these level thresholds.
const CHARGE_THRESHOLDS: [u32; 7] = [3, 5, 8, 13, 21, 34, 55];

/// Base charge capacity at level 1.
const BASE_CHARGES: u32 = 3;

/// Absolute charge capacity cap.
const MAX_CHARGES: u32 = 10;

/// Duels permitted per rolling 24-hour window.
pub const MAX_DUELS_PER_DAY: u32 = 3;

/// A character keeps at most this many story flags; the oldest is evicted.
const MAX_STORY_FLAGS: usize = 2;

/// Oathbreaker corruption never exceeds this.
pub const CORRUPTION_CAP: u32 = 20;

/// XP required to climb out of the given level.
fn xp_for_next_level(level: u32) -> u64 {
    (100.0 * (level as f64).powf(1.5)) as u64
}

/// A player's persistent character. One per external identity, mutated only
/// through action execution and administrative setters, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    id: PlayerId,
    name: String,
    class: CharacterClass,
    level: u32,
    xp: u64,
    xp_to_next_level: u64,
    stats: Stats,
    inventory: Inventory,

    action_charges: u32,
    temporary_charges: u32,
    last_charge_refresh: DateTime<Utc>,
    last_action_at: Option<DateTime<Utc>>,
    last_donation_received: Option<DateTime<Utc>>,

    life: LifeState,
    created_at: DateTime<Utc>,

    enemies_killed: u32,
    elites_killed: u32,
    bosses_killed: u32,
    super_bosses_killed: u32,
    deaths: u32,
    resurrections_received: u32,
    resurrections_performed: u32,
    charges_donated: u32,

    duels_won: u32,
    duels_lost: u32,
    last_duel_at: Option<DateTime<Utc>>,
    duels_in_window: u32,

    corruption: u32,
    story_flags: Vec<String>,
    world_flags: HashSet<WorldFlag>,
}

impl Character {
    /// Creates a fresh level-1 character of the given class.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        class: CharacterClass,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            level: 1,
            xp: 0,
            xp_to_next_level: xp_for_next_level(1),
            stats: class.base_stats(),
            inventory: Inventory::new(),
            action_charges: BASE_CHARGES,
            temporary_charges: 0,
            last_charge_refresh: now,
            last_action_at: None,
            last_donation_received: None,
            life: LifeState::Alive,
            created_at: now,
            enemies_killed: 0,
            elites_killed: 0,
            bosses_killed: 0,
            super_bosses_killed: 0,
            deaths: 0,
            resurrections_received: 0,
            resurrections_performed: 0,
            charges_donated: 0,
            duels_won: 0,
            duels_lost: 0,
            last_duel_at: None,
            duels_in_window: 0,
            corruption: 0,
            story_flags: Vec::new(),
            world_flags: HashSet::new(),
        }
    }

    // ------------------------------------------------------------------
    // Identity & basics
    // ------------------------------------------------------------------

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn class(&self) -> CharacterClass {
        self.class
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn xp_to_next_level(&self) -> u64 {
        self.xp_to_next_level
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        self.last_action_at
    }

    // ------------------------------------------------------------------
    // Leveling
    // ------------------------------------------------------------------

    /// Adds XP and applies as many level-ups as the total supports. A
    /// level-up that raises charge capacity grants one immediate bonus
    /// charge so the character is not starved right after growing.
    ///
    /// Returns whether at least one level was gained.
    pub fn add_xp(&mut self, amount: u64) -> bool {
        self.xp += amount;
        let mut leveled_up = false;
        while self.xp >= self.xp_to_next_level {
            let old_capacity = self.max_action_charges();
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = xp_for_next_level(self.level);
            self.stats.apply_level_growth();
            let new_capacity = self.max_action_charges();
            if new_capacity > old_capacity {
                self.action_charges = (self.action_charges + 1).min(new_capacity);
            }
            leveled_up = true;
        }
        leveled_up
    }

    // ------------------------------------------------------------------
    // Charge economy
    // ------------------------------------------------------------------

    /// Charge capacity for the current level: starts at 3, +1 per threshold
    /// crossed, capped at 10.
    pub fn max_action_charges(&self) -> u32 {
        let mut capacity = BASE_CHARGES;
        for threshold in CHARGE_THRESHOLDS {
            if self.level >= threshold {
                capacity += 1;
            } else {
                break;
            }
        }
        capacity.min(MAX_CHARGES)
    }

    pub fn action_charges(&self) -> u32 {
        self.action_charges
    }

    pub fn temporary_charges(&self) -> u32 {
        self.temporary_charges
    }

    pub fn last_charge_refresh(&self) -> DateTime<Utc> {
        self.last_charge_refresh
    }

    /// Lazily refills charges. Every full `refresh_hours` period since the
    /// last refresh adds a full-capacity batch (clamped to capacity) and
    /// advances the refresh stamp to `now`. Calling again inside the same
    /// window changes nothing.
    pub fn refresh_charges(&mut self, refresh_hours: u32, now: DateTime<Utc>) {
        let refresh_hours = refresh_hours.max(1) as i64;
        let capacity = self.max_action_charges();
        let elapsed = (now - self.last_charge_refresh).num_hours();
        if elapsed < refresh_hours {
            return;
        }
        let cycles = (elapsed / refresh_hours) as u32;
        self.action_charges = self
            .action_charges
            .saturating_add(cycles.saturating_mul(capacity))
            .min(capacity);
        self.last_charge_refresh = now;
    }

    /// Whether any charge (donated or regular) is available.
    pub fn has_charge(&self) -> bool {
        self.temporary_charges > 0 || self.action_charges > 0
    }

    /// Consumes one charge, preferring donated ones, and stamps the action
    /// time. This is the only side effect of "performing an action" on the
    /// economy.
    pub fn spend_charge(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        if self.temporary_charges > 0 {
            self.temporary_charges -= 1;
        } else if self.action_charges > 0 {
            self.action_charges -= 1;
        } else {
            return Err(EngineError::no_charges());
        }
        self.last_action_at = Some(now);
        Ok(())
    }

    /// Administrative setter; clamps into `[0, capacity]`.
    pub fn set_action_charges(&mut self, charges: u32) {
        self.action_charges = charges.min(self.max_action_charges());
    }

    /// Grants one donated charge (spent before regular charges).
    pub fn add_temporary_charge(&mut self) {
        self.temporary_charges += 1;
    }

    pub fn last_donation_received(&self) -> Option<DateTime<Utc>> {
        self.last_donation_received
    }

    pub fn set_last_donation_received(&mut self, at: DateTime<Utc>) {
        self.last_donation_received = Some(at);
    }

    /// Seconds until the next charge batch lands, or zero when full.
    pub fn seconds_until_charge_refresh(&self, refresh_hours: u32, now: DateTime<Utc>) -> i64 {
        if self.action_charges >= self.max_action_charges() {
            return 0;
        }
        let next = self.last_charge_refresh + Duration::hours(refresh_hours.max(1) as i64);
        (next - now).num_seconds().max(0)
    }

    // ------------------------------------------------------------------
    // Life-state machine
    // ------------------------------------------------------------------

    pub fn life(&self) -> LifeState {
        self.life
    }

    /// Applies damage. HP reaching zero transitions the character to Dead.
    /// Returns whether the character survived.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let alive = self.stats.take_damage(amount);
        if !alive {
            self.life = LifeState::Dead;
            self.deaths += 1;
        }
        alive
    }

    /// Brings a dead character back at half HP and starts the recovery
    /// window. The transition itself carries no narrative; callers layer
    /// that on.
    pub fn revive(&mut self, recovery_hours: u32, now: DateTime<Utc>) {
        self.life = LifeState::Recovering {
            until: now + Duration::hours(recovery_hours as i64),
        };
        self.stats.set_current_hp(self.stats.max_hp() / 2);
    }

    /// Clears an expired recovery window. Invoked on access, never by a
    /// background timer.
    pub fn resolve_recovery(&mut self, now: DateTime<Utc>) {
        if let LifeState::Recovering { until } = self.life {
            if now >= until {
                self.life = LifeState::Alive;
            }
        }
    }

    // ------------------------------------------------------------------
    // Duel window
    // ------------------------------------------------------------------

    pub fn duels_won(&self) -> u32 {
        self.duels_won
    }

    pub fn duels_lost(&self) -> u32 {
        self.duels_lost
    }

    pub fn duels_in_window(&self) -> u32 {
        self.duels_in_window
    }

    /// Resets the rolling window once 24 hours have passed since the last
    /// duel.
    pub fn refresh_duel_window(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_duel_at {
            if now - last >= Duration::hours(24) {
                self.duels_in_window = 0;
            }
        }
    }

    /// Whether another duel fits in the rolling window (and the character
    /// is alive).
    pub fn can_duel(&mut self, now: DateTime<Utc>) -> bool {
        self.refresh_duel_window(now);
        self.duels_in_window < MAX_DUELS_PER_DAY && self.life.can_act()
    }

    pub fn record_duel(&mut self, won: bool, now: DateTime<Utc>) {
        if won {
            self.duels_won += 1;
        } else {
            self.duels_lost += 1;
        }
        self.last_duel_at = Some(now);
        self.duels_in_window += 1;
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn increment_enemies_killed(&mut self) {
        self.enemies_killed += 1;
    }

    pub fn elites_killed(&self) -> u32 {
        self.elites_killed
    }

    pub fn increment_elites_killed(&mut self) {
        self.elites_killed += 1;
    }

    pub fn bosses_killed(&self) -> u32 {
        self.bosses_killed
    }

    pub fn increment_bosses_killed(&mut self) {
        self.bosses_killed += 1;
    }

    pub fn super_bosses_killed(&self) -> u32 {
        self.super_bosses_killed
    }

    pub fn increment_super_bosses_killed(&mut self) {
        self.super_bosses_killed += 1;
    }

    pub fn total_boss_kills(&self) -> u32 {
        self.bosses_killed + self.super_bosses_killed
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn resurrections_received(&self) -> u32 {
        self.resurrections_received
    }

    pub fn increment_resurrections_received(&mut self) {
        self.resurrections_received += 1;
    }

    pub fn resurrections_performed(&self) -> u32 {
        self.resurrections_performed
    }

    pub fn increment_resurrections_performed(&mut self) {
        self.resurrections_performed += 1;
    }

    pub fn charges_donated(&self) -> u32 {
        self.charges_donated
    }

    pub fn increment_charges_donated(&mut self) {
        self.charges_donated += 1;
    }

    // ------------------------------------------------------------------
    // Corruption & flags
    // ------------------------------------------------------------------

    pub fn corruption(&self) -> u32 {
        self.corruption
    }

    /// Adds Oathbreaker corruption, clamped at the cap.
    pub fn add_corruption(&mut self, amount: u32) {
        self.corruption = (self.corruption + amount).min(CORRUPTION_CAP);
    }

    pub fn remove_corruption(&mut self, amount: u32) {
        self.corruption = self.corruption.saturating_sub(amount);
    }

    pub fn story_flags(&self) -> &[String] {
        &self.story_flags
    }

    pub fn has_story_flag(&self, flag: &str) -> bool {
        self.story_flags.iter().any(|f| f == flag)
    }

    /// Records a story flag; the oldest is evicted past the window of two.
    pub fn add_story_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if self.has_story_flag(&flag) {
            return;
        }
        if self.story_flags.len() >= MAX_STORY_FLAGS {
            self.story_flags.remove(0);
        }
        self.story_flags.push(flag);
    }

    pub fn has_world_flag(&self, flag: WorldFlag) -> bool {
        self.world_flags.contains(&flag)
    }

    pub fn add_world_flag(&mut self, flag: WorldFlag) {
        self.world_flags.insert(flag);
    }
}
