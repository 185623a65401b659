//! Progression suite: the charge economy over time, leveling, and the
//! crafting loop, all driven through the public service API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use nilfheim_core::curse::CurseService;
use nilfheim_core::inventory::{CatalystKind, CraftedItem, EssenceKind};
use nilfheim_core::lore::NoMilestones;
use nilfheim_core::testing::ScriptedRng;
use nilfheim_core::{
    CharacterClass, CharacterService, EngineError, GuildConfig, PlayerId, StatKind, WorldCurse,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn register_warrior(service: &CharacterService, id: &str) -> PlayerId {
    let pid = PlayerId::from(id);
    service
        .register(pid.clone(), "Thora", CharacterClass::Warrior, t0())
        .unwrap();
    pid
}

// =============================================================================
// Charge economy
// =============================================================================

#[test]
fn test_charges_cap_after_long_absence() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");
    let config = GuildConfig::new("g");

    // Burn everything, then disappear for a week.
    for _ in 0..3 {
        let mut rng = ScriptedRng::new();
        service.perform(&id, "rest", &config, &mut rng, t0()).unwrap();
    }
    let back = t0() + Duration::days(7);
    let mut rng = ScriptedRng::new();
    service.perform(&id, "rest", &config, &mut rng, back).unwrap();

    let c = service.character(&id).unwrap();
    // Many cycles elapsed, but charges clamp to capacity (minus the one
    // just spent).
    assert_eq!(c.action_charges(), c.max_action_charges() - 1);
}

#[test]
fn test_refresh_respects_configured_period() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");
    let mut config = GuildConfig::new("g");
    config.set_charge_refresh_hours(6).unwrap();

    for _ in 0..3 {
        let mut rng = ScriptedRng::new();
        service.perform(&id, "rest", &config, &mut rng, t0()).unwrap();
    }
    // 5 hours in: still empty.
    let mut rng = ScriptedRng::new();
    let err = service
        .perform(&id, "rest", &config, &mut rng, t0() + Duration::hours(5))
        .unwrap_err();
    assert!(matches!(err, EngineError::ResourceExhausted(_)));
    // 6 hours in: refilled.
    let mut rng = ScriptedRng::new();
    service
        .perform(&id, "rest", &config, &mut rng, t0() + Duration::hours(6))
        .unwrap();
}

#[test]
fn test_frozen_time_stretches_the_refresh_window() {
    let curses = Arc::new(CurseService::new());
    let service = CharacterService::new(curses.clone(), Arc::new(NoMilestones));
    let id = register_warrior(&service, "p1");
    let config = GuildConfig::new("g");
    curses.apply("g", WorldCurse::FrozenTime);

    for _ in 0..3 {
        let mut rng = ScriptedRng::new();
        service.perform(&id, "rest", &config, &mut rng, t0()).unwrap();
    }
    // The usual 12-hour mark is no longer enough.
    let mut rng = ScriptedRng::new();
    let err = service
        .perform(&id, "rest", &config, &mut rng, t0() + Duration::hours(13))
        .unwrap_err();
    assert!(matches!(err, EngineError::ResourceExhausted(_)));
    // 12 + 2 hours does it.
    let mut rng = ScriptedRng::new();
    service
        .perform(&id, "rest", &config, &mut rng, t0() + Duration::hours(14))
        .unwrap();
}

#[test]
fn test_charges_never_exceed_capacity_across_operations() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");
    let config = GuildConfig::new("g");

    for step in 0..20u32 {
        let now = t0() + Duration::hours(step as i64 * 7);
        let mut rng = ScriptedRng::new();
        let _ = service.perform(&id, "train", &config, &mut rng, now);
        let c = service.character(&id).unwrap();
        assert!(c.action_charges() <= c.max_action_charges());
    }
}

// =============================================================================
// Leveling
// =============================================================================

#[test]
fn test_large_xp_grant_applies_multiple_levels() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");
    // 100 (L1->2) + 282 (L2->3) = 382, plus 118 carried over.
    service.modify(&id, |c| c.add_xp(500)).unwrap();
    let c = service.character(&id).unwrap();
    assert_eq!(c.level(), 3);
    assert_eq!(c.xp(), 118);
    // Level 3 crosses the first capacity threshold.
    assert_eq!(c.max_action_charges(), 4);
}

#[test]
fn test_zero_xp_never_levels() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");
    service.modify(&id, |c| c.add_xp(0)).unwrap();
    let c = service.character(&id).unwrap();
    assert_eq!(c.level(), 1);
    assert_eq!(c.xp(), 0);
}

// =============================================================================
// Crafting
// =============================================================================

#[test]
fn test_crafting_loop_to_the_cap() {
    let service = CharacterService::with_defaults();
    let id = register_warrior(&service, "p1");

    service
        .modify(&id, |c| {
            c.inventory_mut().add_essence(EssenceKind::EmberShard, 100);
            c.inventory_mut().add_catalyst(CatalystKind::AncientVial, 100);
        })
        .unwrap();

    for _ in 0..5 {
        service
            .modify(&id, |c| c.inventory_mut().craft(CraftedItem::EmberInfusion))
            .unwrap()
            .unwrap();
    }
    let c = service.character(&id).unwrap();
    assert_eq!(c.inventory().crafted_bonus(StatKind::Strength), 5);

    // Materials remain, but the cap holds.
    let result = service
        .modify(&id, |c| c.inventory_mut().craft(CraftedItem::EmberInfusion))
        .unwrap();
    assert!(matches!(result, Err(EngineError::InvariantViolation(_))));
    let c = service.character(&id).unwrap();
    assert_eq!(c.inventory().crafted_bonus(StatKind::Strength), 5);
    assert_eq!(c.inventory().essence_count(EssenceKind::EmberShard), 75);
}
