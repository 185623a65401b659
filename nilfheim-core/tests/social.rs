//! Social suite: donation economics and duel records through the service.

use chrono::{DateTime, Duration, TimeZone, Utc};

use nilfheim_core::testing::ScriptedRng;
use nilfheim_core::{
    CharacterClass, CharacterService, EngineError, GuildConfig, PlayerId,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Registers a character and levels the donor gate away when asked.
fn register(
    service: &CharacterService,
    id: &str,
    class: CharacterClass,
    donor_grade: bool,
) -> PlayerId {
    let pid = PlayerId::from(id);
    service.register(pid.clone(), id, class, t0()).unwrap();
    if donor_grade {
        service.modify(&pid, |c| c.add_xp(50_000)).unwrap();
    }
    pid
}

/// Stamps recent activity and pins the charge count.
fn make_candidate(service: &CharacterService, id: &PlayerId, charges: u32, at: DateTime<Utc>) {
    service
        .modify(id, |c| {
            c.set_action_charges(charges + 1);
            c.spend_charge(at).unwrap();
        })
        .unwrap();
}

// =============================================================================
// Donation
// =============================================================================

#[test]
fn test_donation_picks_from_the_poorer_half() {
    let service = CharacterService::with_defaults();
    let donor = register(&service, "donor", CharacterClass::Priest, true);
    let poor = register(&service, "a-poor", CharacterClass::Rogue, false);
    let low = register(&service, "b-low", CharacterClass::Mage, false);
    let mid = register(&service, "c-mid", CharacterClass::Knight, false);
    let rich = register(&service, "d-rich", CharacterClass::Warrior, false);

    let active_at = t0() + Duration::minutes(30);
    make_candidate(&service, &poor, 0, active_at);
    make_candidate(&service, &low, 1, active_at);
    make_candidate(&service, &mid, 2, active_at);
    make_candidate(&service, &rich, 3, active_at);

    let config = GuildConfig::new("g");
    let now = t0() + Duration::hours(1);
    // Candidate pool is the two with the fewest charges; index 1 -> "b-low".
    let mut rng = ScriptedRng::new().rolls([1]);
    let outcome = service.donate(&donor, &config, &mut rng, now).unwrap();
    assert!(outcome.success);

    assert_eq!(service.character(&low).unwrap().temporary_charges(), 1);
    assert_eq!(service.character(&rich).unwrap().temporary_charges(), 0);
    let d = service.character(&donor).unwrap();
    assert_eq!(d.charges_donated(), 1);
}

#[test]
fn test_donation_charge_survives_empty_pool() {
    let service = CharacterService::with_defaults();
    let donor = register(&service, "donor", CharacterClass::Priest, true);
    // A roster of one: nobody to give to.
    let config = GuildConfig::new("g");
    let mut rng = ScriptedRng::new();
    let before = service.character(&donor).unwrap().action_charges();
    let outcome = service.donate(&donor, &config, &mut rng, t0()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.xp_gained, 0);
    assert_eq!(service.character(&donor).unwrap().action_charges(), before);
}

#[test]
fn test_recipient_cannot_be_gifted_twice_in_one_cycle() {
    let service = CharacterService::with_defaults();
    let donor = register(&service, "donor", CharacterClass::Priest, true);
    let only = register(&service, "only", CharacterClass::Rogue, false);
    make_candidate(&service, &only, 0, t0() + Duration::minutes(5));

    let config = GuildConfig::new("g");
    let now = t0() + Duration::hours(1);
    let mut rng = ScriptedRng::new();
    service.donate(&donor, &config, &mut rng, now).unwrap();
    assert_eq!(service.character(&only).unwrap().temporary_charges(), 1);

    // Same refresh cycle: the only candidate is exhausted, so the charge
    // is preserved.
    let before = service.character(&donor).unwrap().action_charges();
    let mut rng = ScriptedRng::new();
    let outcome = service
        .donate(&donor, &config, &mut rng, now + Duration::minutes(10))
        .unwrap();
    assert!(outcome.success);
    assert_eq!(service.character(&donor).unwrap().action_charges(), before);
    assert_eq!(service.character(&only).unwrap().temporary_charges(), 1);
}

#[test]
fn test_dead_and_idle_characters_are_not_recipients() {
    let service = CharacterService::with_defaults();
    let donor = register(&service, "donor", CharacterClass::Priest, true);
    let dead = register(&service, "dead", CharacterClass::Rogue, false);
    let idle = register(&service, "idle", CharacterClass::Mage, false);
    make_candidate(&service, &dead, 0, t0() + Duration::minutes(5));
    service.modify(&dead, |c| c.take_damage(100_000)).unwrap();
    // "idle" never acted at all.
    let _ = idle;

    let config = GuildConfig::new("g");
    let before = service.character(&donor).unwrap().action_charges();
    let mut rng = ScriptedRng::new();
    let outcome = service
        .donate(&donor, &config, &mut rng, t0() + Duration::hours(1))
        .unwrap();
    assert!(outcome.success);
    assert_eq!(service.character(&donor).unwrap().action_charges(), before);
}

// =============================================================================
// Duels
// =============================================================================

#[test]
fn test_duel_round_trip_and_rate_limit() {
    let service = CharacterService::with_defaults();
    let a = register(&service, "a", CharacterClass::Warrior, false);
    let b = register(&service, "b", CharacterClass::Rogue, false);
    let config = GuildConfig::new("g");

    for round in 0..3 {
        // Challenger jitter +9, defender -10: the warrior always wins.
        let mut rng = ScriptedRng::new().jitters([9, -10]);
        let now = t0() + Duration::minutes(round as i64);
        let outcome = service.duel(&a, &b, &config, &mut rng, now).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.xp_gained, 0);
        assert_eq!(outcome.damage_taken, 0);
    }

    let a_char = service.character(&a).unwrap();
    let b_char = service.character(&b).unwrap();
    assert_eq!(a_char.duels_won(), 3);
    assert_eq!(b_char.duels_lost(), 3);
    // No HP moved on either side.
    assert_eq!(a_char.stats().current_hp(), a_char.stats().max_hp());
    assert_eq!(b_char.stats().current_hp(), b_char.stats().max_hp());

    // Both sides are now rate-limited inside the window.
    let mut rng = ScriptedRng::new().jitters([9, -10]);
    let err = service
        .duel(&a, &b, &config, &mut rng, t0() + Duration::hours(12))
        .unwrap_err();
    assert!(matches!(err, EngineError::ResourceExhausted(_)));

    // Once 24 hours pass since the last duel, the window resets.
    let mut rng = ScriptedRng::new().jitters([9, -10]);
    service
        .duel(&a, &b, &config, &mut rng, t0() + Duration::hours(25))
        .unwrap();
}

#[test]
fn test_duel_against_unknown_character() {
    let service = CharacterService::with_defaults();
    let a = register(&service, "a", CharacterClass::Warrior, false);
    let ghost = PlayerId::from("ghost");
    let config = GuildConfig::new("g");
    let mut rng = ScriptedRng::new();
    let err = service.duel(&a, &ghost, &config, &mut rng, t0()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
