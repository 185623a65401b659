//! Character progression and action-resolution engine for the Nilfheim RPG.
//!
//! This crate provides:
//! - Persistent characters with classes, stats, leveling and an
//!   action-charge economy
//! - A life/death/recovery state machine with lazy recovery resolution
//! - Interchangeable actions (explore, train, rest, battle) plus the
//!   two-character donation, resurrection and duel engines
//! - Static content catalogs: enemies, elite traits, bosses, super bosses
//! - World curses and lore-milestone recognition at the collaborator seams
//!
//! All randomness flows through an injectable [`rng::Randomizer`] and all
//! time-dependent rules take `now` explicitly, so every outcome is
//! reproducible in tests.
//!
//! # Quick start
//!
//! ```
//! use chrono::Utc;
//! use nilfheim_core::{
//!     CharacterClass, CharacterService, GuildConfig, PlayerId, StdRandomizer,
//! };
//!
//! let service = CharacterService::with_defaults();
//! let config = GuildConfig::new("guild-1");
//! let id = PlayerId::from("player-1");
//! let now = Utc::now();
//!
//! service.register(id.clone(), "Thora", CharacterClass::Warrior, now)?;
//! let mut rng = StdRandomizer::new();
//! let outcome = service.perform(&id, "battle", &config, &mut rng, now)?;
//! println!("{}", outcome.narrative);
//! # Ok::<(), nilfheim_core::EngineError>(())
//! ```

pub mod actions;
pub mod catalog;
pub mod class_data;
pub mod config;
pub mod curse;
pub mod error;
pub mod inventory;
pub mod lore;
pub mod outcome;
pub mod persist;
pub mod rng;
pub mod service;
pub mod testing;
pub mod world;

// Primary public API
pub use actions::{Action, ActionContext, ActionSet, DuelEngine, ResurrectEngine};
pub use catalog::{Boss, BossType, EliteTrait, EnemyType, SuperBoss};
pub use config::GuildConfig;
pub use curse::{CurseService, WorldCurse, WorldCurseProvider};
pub use error::EngineError;
pub use inventory::{CatalystKind, CraftedItem, EssenceKind, Inventory};
pub use lore::{LoreMilestoneChecker, StoryMilestones};
pub use outcome::Outcome;
pub use rng::{Randomizer, StdRandomizer};
pub use service::{CharacterRepository, CharacterService};
pub use world::{Character, CharacterClass, LifeState, PlayerId, StatKind, Stats, WorldFlag};
