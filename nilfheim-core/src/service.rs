//! Character bookkeeping and action orchestration.
//!
//! The service owns one mutex per character key and serializes access so at
//! most one action is in flight per character. Operations touching two
//! characters (donation, resurrection, duels) always acquire the two locks
//! in ascending key order, never in caller order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::actions::{
    eligible_recipients, pick_recipient, ActionContext, ActionSet, CandidateProfile, DuelEngine,
    ResurrectEngine, DONATION_MIN_LEVEL,
};
use crate::config::GuildConfig;
use crate::curse::{CurseService, WorldCurse, WorldCurseProvider, FROZEN_TIME_EXTRA_HOURS};
use crate::error::EngineError;
use crate::lore::{LoreMilestoneChecker, StoryMilestones};
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::world::{Character, CharacterClass, PlayerId};

/// Storage boundary consumed by the engine: resolve one character, scan the
/// roster, persist one character.
pub trait CharacterRepository: Send + Sync {
    fn get(&self, id: &PlayerId) -> Option<Character>;
    fn all(&self) -> Vec<Character>;
    fn save(&self, character: Character);
}

type Handle = Arc<Mutex<Character>>;

fn lock(handle: &Handle) -> MutexGuard<'_, Character> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Locks two distinct characters in ascending key order (never caller
/// order, so concurrent two-character operations cannot deadlock) and
/// returns the guards as (first_requested, second_requested).
fn lock_pair<'a>(
    a_id: &PlayerId,
    a: &'a Handle,
    b_id: &PlayerId,
    b: &'a Handle,
) -> (MutexGuard<'a, Character>, MutexGuard<'a, Character>) {
    if a_id <= b_id {
        let ga = lock(a);
        let gb = lock(b);
        (ga, gb)
    } else {
        let gb = lock(b);
        let ga = lock(a);
        (ga, gb)
    }
}

/// In-memory character roster plus the action dispatch machinery.
pub struct CharacterService {
    characters: RwLock<HashMap<PlayerId, Handle>>,
    actions: ActionSet,
    resurrect_engine: ResurrectEngine,
    duel_engine: DuelEngine,
    curses: Arc<dyn WorldCurseProvider>,
    lore: Arc<dyn LoreMilestoneChecker>,
}

impl CharacterService {
    pub fn new(curses: Arc<dyn WorldCurseProvider>, lore: Arc<dyn LoreMilestoneChecker>) -> Self {
        Self {
            characters: RwLock::new(HashMap::new()),
            actions: ActionSet::standard(),
            resurrect_engine: ResurrectEngine::new(),
            duel_engine: DuelEngine::new(),
            curses,
            lore,
        }
    }

    /// Service with an empty curse table and the standard milestone set.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(CurseService::new()), Arc::new(StoryMilestones::new()))
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Registers a character for an external identity. Idempotence is by
    /// rejection: a second registration under the same key fails.
    pub fn register(
        &self,
        id: PlayerId,
        name: impl Into<String>,
        class: CharacterClass,
        now: DateTime<Utc>,
    ) -> Result<Character, EngineError> {
        let mut roster = self
            .characters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if roster.contains_key(&id) {
            return Err(EngineError::AlreadyRegistered(id));
        }
        let character = Character::new(id.clone(), name, class, now);
        roster.insert(id.clone(), Arc::new(Mutex::new(character.clone())));
        info!(player = %id, class = %class, "registered character");
        Ok(character)
    }

    pub fn has_character(&self, id: &PlayerId) -> bool {
        self.characters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Snapshot of a character's current state.
    pub fn character(&self, id: &PlayerId) -> Option<Character> {
        self.handle(id).ok().map(|h| lock(&h).clone())
    }

    pub fn character_count(&self) -> usize {
        self.characters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Administrative door: run a closure against a character under its
    /// lock.
    pub fn modify<R>(
        &self,
        id: &PlayerId,
        f: impl FnOnce(&mut Character) -> R,
    ) -> Result<R, EngineError> {
        let handle = self.handle(id)?;
        let mut character = lock(&handle);
        Ok(f(&mut character))
    }

    /// Top characters by (level, xp), descending.
    pub fn leaderboard(&self, limit: usize) -> Vec<Character> {
        let mut all = self.all();
        all.sort_by(|a, b| {
            b.level()
                .cmp(&a.level())
                .then_with(|| b.xp().cmp(&a.xp()))
                .then_with(|| a.id().cmp(b.id()))
        });
        all.truncate(limit);
        all
    }

    pub fn available_actions(&self) -> Vec<&'static str> {
        self.actions.names()
    }

    fn handle(&self, id: &PlayerId) -> Result<Handle, EngineError> {
        self.characters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Resolves eligibility and runs a single-character action by name.
    pub fn perform(
        &self,
        id: &PlayerId,
        action_name: &str,
        config: &GuildConfig,
        rng: &mut dyn Randomizer,
        now: DateTime<Utc>,
    ) -> Result<Outcome, EngineError> {
        let action = self
            .actions
            .get(action_name)
            .ok_or_else(|| EngineError::UnknownAction(action_name.to_string()))?;
        let handle = self.handle(id)?;
        let mut character = lock(&handle);

        let curse_set = self.curses.active_curses(config.guild_id());
        character.refresh_charges(effective_refresh_hours(config, &curse_set), now);
        character.resolve_recovery(now);
        if !character.life().can_act() {
            return Err(EngineError::Incapacitated(character.life()));
        }
        if !character.has_charge() {
            return Err(EngineError::no_charges());
        }

        let mut ctx = ActionContext {
            config,
            now,
            rng,
            curses: &curse_set,
            lore: self.lore.as_ref(),
        };
        let outcome = action.execute(&mut character, &mut ctx)?;
        info!(
            player = %id,
            action = action_name,
            xp = outcome.xp_gained,
            success = outcome.success,
            "action resolved"
        );
        Ok(outcome)
    }

    /// Donates one charge to a random under-supplied active player. The
    /// charge is only spent when a recipient actually exists.
    pub fn donate(
        &self,
        donor_id: &PlayerId,
        config: &GuildConfig,
        rng: &mut dyn Randomizer,
        now: DateTime<Utc>,
    ) -> Result<Outcome, EngineError> {
        let donor_handle = self.handle(donor_id)?;
        let curse_set = self.curses.active_curses(config.guild_id());

        // Gate and snapshot the donor, then release the lock before
        // scanning the roster.
        let donor_snapshot = {
            let mut donor = lock(&donor_handle);
            donor.refresh_charges(effective_refresh_hours(config, &curse_set), now);
            donor.resolve_recovery(now);
            if !donor.life().can_act() {
                return Err(EngineError::Incapacitated(donor.life()));
            }
            if donor.level() < DONATION_MIN_LEVEL {
                return Ok(Outcome {
                    narrative: format!(
                        "You must reach level {DONATION_MIN_LEVEL} before you can donate charges."
                    ),
                    success: false,
                    ..Outcome::default()
                });
            }
            if !donor.has_charge() {
                return Err(EngineError::no_charges());
            }
            donor.clone()
        };

        let profiles = self.candidate_profiles(donor_id, now);
        let eligible = eligible_recipients(&donor_snapshot, &profiles, now);
        let Some(recipient) = pick_recipient(&eligible, rng) else {
            // Non-error no-op: the charge is preserved.
            return Ok(Outcome::narrative_only(
                "You look around, but everyone seems well-rested. \
                 Your generosity will have to wait.",
            ));
        };

        let recipient_handle = self.handle(&recipient.id)?;
        let (mut donor, mut recipient) =
            lock_pair(donor_id, &donor_handle, &recipient.id, &recipient_handle);
        // Re-validate under the pair lock; the roster may have moved.
        if !donor.has_charge() {
            return Err(EngineError::no_charges());
        }
        donor.spend_charge(now)?;
        donor.increment_charges_donated();
        recipient.add_temporary_charge();
        recipient.set_last_donation_received(now);
        info!(donor = %donor.id(), recipient = %recipient.id(), "charge donated");

        Ok(Outcome::narrative_only(format!(
            "You share your energy with a fellow adventurer. {} feels reinvigorated!",
            recipient.name()
        )))
    }

    /// Runs a duel between two characters.
    pub fn duel(
        &self,
        challenger_id: &PlayerId,
        target_id: &PlayerId,
        config: &GuildConfig,
        rng: &mut dyn Randomizer,
        now: DateTime<Utc>,
    ) -> Result<Outcome, EngineError> {
        if challenger_id == target_id {
            return Err(EngineError::InvariantViolation(
                "a character cannot duel themselves".to_string(),
            ));
        }
        let challenger_handle = self.handle(challenger_id)?;
        let target_handle = self.handle(target_id)?;
        let (mut challenger, mut target) =
            lock_pair(challenger_id, &challenger_handle, target_id, &target_handle);
        challenger.resolve_recovery(now);
        target.resolve_recovery(now);

        let curse_set = self.curses.active_curses(config.guild_id());
        let mut ctx = ActionContext {
            config,
            now,
            rng,
            curses: &curse_set,
            lore: self.lore.as_ref(),
        };
        let outcome = self
            .duel_engine
            .execute_duel(&mut challenger, &mut target, &mut ctx)?;
        info!(
            challenger = %challenger_id,
            target = %target_id,
            challenger_won = outcome.success,
            "duel resolved"
        );
        Ok(outcome)
    }

    /// Runs the Priest-only resurrection against a target character.
    pub fn resurrect(
        &self,
        priest_id: &PlayerId,
        target_id: &PlayerId,
        config: &GuildConfig,
        rng: &mut dyn Randomizer,
        now: DateTime<Utc>,
    ) -> Result<Outcome, EngineError> {
        if priest_id == target_id {
            return Err(EngineError::InvariantViolation(
                "a Priest cannot resurrect themselves".to_string(),
            ));
        }
        let priest_handle = self.handle(priest_id)?;
        let target_handle = self.handle(target_id)?;
        let (mut priest, mut target) =
            lock_pair(priest_id, &priest_handle, target_id, &target_handle);
        priest.resolve_recovery(now);
        target.resolve_recovery(now);
        if !priest.life().can_act() {
            return Err(EngineError::Incapacitated(priest.life()));
        }

        let curse_set = self.curses.active_curses(config.guild_id());
        let mut ctx = ActionContext {
            config,
            now,
            rng,
            curses: &curse_set,
            lore: self.lore.as_ref(),
        };
        let outcome = self
            .resurrect_engine
            .execute_with_target(&mut priest, &mut target, &mut ctx)?;
        info!(priest = %priest_id, target = %target_id, "resurrection resolved");
        Ok(outcome)
    }

    /// Snapshots donation-relevant state for everyone but the donor. Each
    /// character is locked briefly and individually; no ordering concerns
    /// because no other lock is held.
    fn candidate_profiles(&self, donor_id: &PlayerId, now: DateTime<Utc>) -> Vec<CandidateProfile> {
        let handles: Vec<Handle> = {
            let roster = self
                .characters
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            roster
                .iter()
                .filter(|(id, _)| id != &donor_id)
                .map(|(_, h)| h.clone())
                .collect()
        };
        handles
            .iter()
            .map(|h| {
                let mut character = lock(h);
                character.resolve_recovery(now);
                CandidateProfile::of(&character)
            })
            .collect()
    }
}

impl CharacterRepository for CharacterService {
    fn get(&self, id: &PlayerId) -> Option<Character> {
        self.character(id)
    }

    fn all(&self) -> Vec<Character> {
        let handles: Vec<Handle> = {
            let roster = self
                .characters
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            roster.values().cloned().collect()
        };
        handles.iter().map(|h| lock(h).clone()).collect()
    }

    fn save(&self, character: Character) {
        let mut roster = self
            .characters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match roster.get(character.id()) {
            Some(handle) => *lock(handle) = character,
            None => {
                roster.insert(
                    character.id().clone(),
                    Arc::new(Mutex::new(character)),
                );
            }
        }
    }
}

/// The refresh period, stretched while Frozen Time is active.
fn effective_refresh_hours(
    config: &GuildConfig,
    curses: &std::collections::HashSet<WorldCurse>,
) -> u32 {
    let mut hours = config.charge_refresh_hours();
    if curses.contains(&WorldCurse::FrozenTime) {
        hours += FROZEN_TIME_EXTRA_HOURS;
    }
    hours
}
