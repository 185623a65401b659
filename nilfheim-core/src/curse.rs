//! World curses: guild-scoped temporary modifiers applied when a boss
//! despawns undefeated.
//!
//! The engine consults curses through [`WorldCurseProvider`]; the bundled
//! in-memory service is what the bot wires in, but tests can hand the
//! actions any set they like.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Curse weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurseSeverity {
    /// Applied when a normal boss escapes.
    Minor,
    /// Applied when a super boss escapes.
    Major,
}

/// When a curse lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurseDuration {
    /// Cleared when the next boss spawns.
    UntilNextSpawn,
    /// Cleared when the next boss is defeated.
    UntilNextDefeat,
}

/// Guild-wide curses. Every player feels them equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldCurse {
    // Minor (normal-boss failure)
    CurseOfFrailty,
    CurseOfWeakness,
    CurseOfSluggishSteps,
    CurseOfCloudedMind,
    CurseOfIllFortune,
    CurseOfBleedingWounds,
    CurseOfWaningResolve,
    // Major (super-boss failure)
    EclipseOfNilfheim,
    MarchOfTheDead,
    FadingHope,
    FrozenTime,
    ShatteredReality,
    WorldAflame,
    PriceOfSurvival,
}

impl WorldCurse {
    pub fn name(&self) -> &'static str {
        match self {
            WorldCurse::CurseOfFrailty => "Curse of Frailty",
            WorldCurse::CurseOfWeakness => "Curse of Weakness",
            WorldCurse::CurseOfSluggishSteps => "Curse of Sluggish Steps",
            WorldCurse::CurseOfCloudedMind => "Curse of Clouded Mind",
            WorldCurse::CurseOfIllFortune => "Curse of Ill Fortune",
            WorldCurse::CurseOfBleedingWounds => "Curse of Bleeding Wounds",
            WorldCurse::CurseOfWaningResolve => "Curse of Waning Resolve",
            WorldCurse::EclipseOfNilfheim => "Eclipse of Nilfheim",
            WorldCurse::MarchOfTheDead => "March of the Dead",
            WorldCurse::FadingHope => "Fading Hope",
            WorldCurse::FrozenTime => "Frozen Time",
            WorldCurse::ShatteredReality => "Shattered Reality",
            WorldCurse::WorldAflame => "World Aflame",
            WorldCurse::PriceOfSurvival => "Price of Survival",
        }
    }

    pub fn flavor(&self) -> &'static str {
        match self {
            WorldCurse::CurseOfFrailty => "The cold seeps into bone and marrow.",
            WorldCurse::CurseOfWeakness => "Steel feels heavier in your grasp.",
            WorldCurse::CurseOfSluggishSteps => "The winds resist every movement.",
            WorldCurse::CurseOfCloudedMind => "Thoughts scatter like frostbitten ash.",
            WorldCurse::CurseOfIllFortune => "Luck turns its gaze away.",
            WorldCurse::CurseOfBleedingWounds => "Wounds refuse to close.",
            WorldCurse::CurseOfWaningResolve => "Doubt gnaws at the spirit.",
            WorldCurse::EclipseOfNilfheim => "The sky darkens. Hope thins.",
            WorldCurse::MarchOfTheDead => "The fallen refuse to rest.",
            WorldCurse::FadingHope => "The light grows harder to summon.",
            WorldCurse::FrozenTime => "Time itself slows beneath the frost.",
            WorldCurse::ShatteredReality => "Reality fractures under eldritch strain.",
            WorldCurse::WorldAflame => "The world burns with unnatural fury.",
            WorldCurse::PriceOfSurvival => "Every victory exacts a toll.",
        }
    }

    pub fn severity(&self) -> CurseSeverity {
        match self {
            WorldCurse::CurseOfFrailty
            | WorldCurse::CurseOfWeakness
            | WorldCurse::CurseOfSluggishSteps
            | WorldCurse::CurseOfCloudedMind
            | WorldCurse::CurseOfIllFortune
            | WorldCurse::CurseOfBleedingWounds
            | WorldCurse::CurseOfWaningResolve => CurseSeverity::Minor,
            _ => CurseSeverity::Major,
        }
    }

    pub fn duration(&self) -> CurseDuration {
        match self {
            WorldCurse::FrozenTime => CurseDuration::UntilNextSpawn,
            c if c.severity() == CurseSeverity::Minor => CurseDuration::UntilNextSpawn,
            _ => CurseDuration::UntilNextDefeat,
        }
    }
}

impl fmt::Display for WorldCurse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Extra hours the Frozen Time curse adds to the charge refresh period.
pub const FROZEN_TIME_EXTRA_HOURS: u32 = 2;

/// Recovery window under Fading Hope, instead of the default 24 hours.
pub const FADING_HOPE_RECOVERY_HOURS: u32 = 36;

/// Default recovery window after resurrection.
pub const DEFAULT_RECOVERY_HOURS: u32 = 24;

/// Read-only view of the curses currently afflicting a guild.
///
/// Lookups are cheap and always reflect current guild state; the engine
/// queries once per action invocation and never caches across invocations.
pub trait WorldCurseProvider: Send + Sync {
    fn active_curses(&self, guild_id: &str) -> HashSet<WorldCurse>;
}

/// In-memory curse bookkeeping, one slot per severity per guild.
#[derive(Debug, Default)]
pub struct CurseService {
    by_guild: RwLock<HashMap<String, HashSet<WorldCurse>>>,
}

impl CurseService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a curse. A second curse of the same severity replaces the
    /// first; one minor and one major can coexist.
    pub fn apply(&self, guild_id: &str, curse: WorldCurse) {
        let mut guard = self
            .by_guild
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let curses = guard.entry(guild_id.to_string()).or_default();
        curses.retain(|c| c.severity() != curse.severity());
        curses.insert(curse);
    }

    pub fn remove(&self, guild_id: &str, curse: WorldCurse) {
        let mut guard = self
            .by_guild
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(curses) = guard.get_mut(guild_id) {
            curses.remove(&curse);
        }
    }

    pub fn clear_all(&self, guild_id: &str) {
        let mut guard = self
            .by_guild
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(guild_id);
    }

    /// Lifts the curses that end when a new boss spawns.
    pub fn clear_on_spawn(&self, guild_id: &str) {
        self.clear_matching(guild_id, CurseDuration::UntilNextSpawn);
    }

    /// Lifts the curses that end when a boss is defeated.
    pub fn clear_on_defeat(&self, guild_id: &str) {
        self.clear_matching(guild_id, CurseDuration::UntilNextDefeat);
    }

    fn clear_matching(&self, guild_id: &str, duration: CurseDuration) {
        let mut guard = self
            .by_guild
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(curses) = guard.get_mut(guild_id) {
            curses.retain(|c| c.duration() != duration);
        }
    }
}

impl WorldCurseProvider for CurseService {
    fn active_curses(&self, guild_id: &str) -> HashSet<WorldCurse> {
        let guard = self.by_guild.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(guild_id).cloned().unwrap_or_default()
    }
}
