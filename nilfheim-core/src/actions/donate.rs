//! Donation: hand one action charge to a random under-supplied player.
//!
//! Candidate selection is pure so it can be tested in isolation; the
//! service collects [`CandidateProfile`]s under its own locks and commits
//! the transfer (see `service::CharacterService::donate`).

use chrono::{DateTime, Duration, Utc};

use crate::rng::Randomizer;
use crate::world::{Character, LifeState, PlayerId};

/// Donors must have reached this level.
pub const DONATION_MIN_LEVEL: u32 = 10;

/// A recipient counts as active if they acted within this window.
const ACTIVE_THRESHOLD_HOURS: i64 = 24;

/// Snapshot of another character's donation-relevant state, taken under its
/// own lock before any ordering decisions are made.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub id: PlayerId,
    pub charges: u32,
    pub life: LifeState,
    pub last_action_at: Option<DateTime<Utc>>,
    pub last_donation_received: Option<DateTime<Utc>>,
}

impl CandidateProfile {
    pub fn of(character: &Character) -> Self {
        Self {
            id: character.id().clone(),
            charges: character.action_charges(),
            life: character.life(),
            last_action_at: character.last_action_at(),
            last_donation_received: character.last_donation_received(),
        }
    }

    fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.last_action_at {
            Some(at) => now - at <= Duration::hours(ACTIVE_THRESHOLD_HOURS),
            None => false,
        }
    }

    /// A character may receive again once the donor has been through a
    /// charge refresh since their last gift; this keeps charges from
    /// circulating between the same two players inside one cycle.
    fn can_receive(&self, donor_last_refresh: DateTime<Utc>) -> bool {
        match self.last_donation_received {
            Some(received) => received <= donor_last_refresh,
            None => true,
        }
    }
}

/// Filters and orders the donation candidates: everyone but the donor who
/// is alive, recently active and not already gifted this cycle, sorted
/// ascending by charge count.
pub fn eligible_recipients(
    donor: &Character,
    roster: &[CandidateProfile],
    now: DateTime<Utc>,
) -> Vec<CandidateProfile> {
    let mut eligible: Vec<CandidateProfile> = roster
        .iter()
        .filter(|p| p.id != *donor.id())
        .filter(|p| p.life == LifeState::Alive)
        .filter(|p| p.is_active(now))
        .filter(|p| p.can_receive(donor.last_charge_refresh()))
        .cloned()
        .collect();
    eligible.sort_by(|a, b| a.charges.cmp(&b.charges).then_with(|| a.id.cmp(&b.id)));
    eligible
}

/// Picks uniformly from the poorer half of the eligible set (the half with
/// the fewest charges; with an odd count the pivot is included).
pub fn pick_recipient<'a>(
    eligible: &'a [CandidateProfile],
    rng: &mut dyn Randomizer,
) -> Option<&'a CandidateProfile> {
    if eligible.is_empty() {
        return None;
    }
    let pool = &eligible[..eligible.len().div_ceil(2)];
    Some(&pool[rng.roll(pool.len() as u32) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRng;
    use crate::world::CharacterClass;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn donor() -> Character {
        Character::new(PlayerId::from("donor"), "Gild", CharacterClass::Priest, t0())
    }

    fn profile(id: &str, charges: u32, active_at: DateTime<Utc>) -> CandidateProfile {
        CandidateProfile {
            id: PlayerId::from(id),
            charges,
            life: LifeState::Alive,
            last_action_at: Some(active_at),
            last_donation_received: None,
        }
    }

    #[test]
    fn test_filters_and_sorts_ascending() {
        let donor = donor();
        let now = t0() + Duration::hours(1);
        let mut dead = profile("dead", 0, now);
        dead.life = LifeState::Dead;
        let idle = CandidateProfile {
            last_action_at: None,
            ..profile("idle", 0, now)
        };
        let stale = profile("stale", 0, now - Duration::hours(30));
        let roster = vec![
            profile("rich", 5, now),
            profile("poor", 0, now),
            dead,
            idle,
            stale,
            profile("mid", 2, now),
        ];
        let eligible = eligible_recipients(&donor, &roster, now);
        let ids: Vec<&str> = eligible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["poor", "mid", "rich"]);
    }

    #[test]
    fn test_donor_excluded() {
        let donor = donor();
        let now = t0() + Duration::hours(1);
        let roster = vec![profile("donor", 0, now)];
        assert!(eligible_recipients(&donor, &roster, now).is_empty());
    }

    #[test]
    fn test_already_gifted_this_cycle_excluded() {
        let donor = donor();
        let now = t0() + Duration::hours(1);
        let mut gifted = profile("gifted", 0, now);
        // Donation landed after the donor's last refresh (at t0).
        gifted.last_donation_received = Some(t0() + Duration::minutes(30));
        let mut earlier = profile("earlier", 0, now);
        // Donation predates the donor's refresh; eligible again.
        earlier.last_donation_received = Some(t0() - Duration::hours(1));
        let eligible = eligible_recipients(&donor, &[gifted, earlier], now);
        let ids: Vec<&str> = eligible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["earlier"]);
    }

    #[test]
    fn test_pick_draws_from_poorer_half() {
        let now = t0() + Duration::hours(1);
        let eligible = vec![
            profile("a", 0, now),
            profile("b", 1, now),
            profile("c", 4, now),
            profile("d", 9, now),
        ];
        // Pool is the first two; index 1 picks "b".
        let mut rng = ScriptedRng::new().rolls([1]);
        let picked = pick_recipient(&eligible, &mut rng).unwrap();
        assert_eq!(picked.id.as_str(), "b");
    }

    #[test]
    fn test_pick_single_candidate() {
        let now = t0() + Duration::hours(1);
        let eligible = vec![profile("only", 3, now)];
        let mut rng = ScriptedRng::new();
        assert_eq!(
            pick_recipient(&eligible, &mut rng).unwrap().id.as_str(),
            "only"
        );
    }

    #[test]
    fn test_pick_empty_is_none() {
        let mut rng = ScriptedRng::new();
        assert!(pick_recipient(&[], &mut rng).is_none());
    }
}
