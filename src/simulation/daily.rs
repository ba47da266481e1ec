//! Daily cycle: day rollover, challenge regeneration, streak continuity.
//!
//! The rollover check runs defensively ahead of every user action, so a
//! profile idle for days reconciles lazily instead of via a background clock.
//! Within one calendar day it is idempotent.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::core::rng::{roll_index, roll_range};
use crate::data::species::Element;
use crate::simulation::ledger::credit_currency;
use crate::simulation::profile::{PlayerProfile, BOSS_ENERGY_CAP, ENERGY_CAP};
use crate::simulation::time::day_index;

pub const CHALLENGE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    CatchCount,
    WinBattles,
    CatchElement(Element),
    CompleteMinigames,
}

/// A progress delta reported by the other subsystems. Signals are routed
/// 1:1; a catch reports both a `Catch` and a `CatchElement` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    Catch,
    CatchElement(Element),
    WinBattle,
    Minigame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: u32,
    pub kind: ChallengeKind,
    pub target: u32,
    pub progress: u32,
    pub completed: bool,
    pub claimed: bool,
    pub reward: u32,
}

impl DailyChallenge {
    pub fn describe(&self) -> String {
        match self.kind {
            ChallengeKind::CatchCount => format!("Catch {} creatures", self.target),
            ChallengeKind::WinBattles => format!("Win {} battles", self.target),
            ChallengeKind::CatchElement(element) => {
                format!("Catch {} {} creatures", self.target, element)
            }
            ChallengeKind::CompleteMinigames => {
                format!("Attempt {} catch minigames", self.target)
            }
        }
    }
}

/// The 3 live daily challenges. Persisted; regenerated as a set on rollover.
#[derive(Resource, Debug, Default, Clone, Serialize, Deserialize)]
pub struct DailyState {
    pub challenges: Vec<DailyChallenge>,
}

impl DailyState {
    pub fn all_completed(&self) -> bool {
        self.challenges.len() == CHALLENGE_COUNT && self.challenges.iter().all(|c| c.completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakReward {
    pub currency: u32,
    pub bonus_energy: u8,
}

/// Reconcile the calendar day. On a new day: evaluate yesterday's challenge
/// completion for the streak, refill boss energy, regenerate the challenge
/// set, and clear the streak-claim flag. Returns whether a rollover fired.
pub fn ensure_daily_cycle(
    profile: &mut PlayerProfile,
    daily: &mut DailyState,
    rng: &mut u64,
    now: u64,
) -> bool {
    let today = day_index(now);
    let last = day_index(profile.challenges_reset);
    if today == last {
        return false;
    }

    // The streak survives only a completed set on the immediately preceding
    // day; a multi-day gap breaks continuity even if that old set was done.
    if daily.all_completed() && today == last + 1 {
        profile.streak += 1;
    } else {
        profile.streak = 0;
    }

    profile.boss_energy = BOSS_ENERGY_CAP;
    profile.boss_energy_reset = now;
    profile.streak_claimed = false;
    profile.challenges_reset = now;
    daily.challenges = generate_challenges(rng, today);
    true
}

/// Draw 3 challenges of distinct kinds for the given day.
pub fn generate_challenges(rng: &mut u64, day: u64) -> Vec<DailyChallenge> {
    let mut archetypes = vec![0usize, 1, 2, 3];
    let mut challenges = Vec::with_capacity(CHALLENGE_COUNT);
    for slot in 0..CHALLENGE_COUNT {
        let archetype = archetypes.remove(roll_index(rng, archetypes.len()));
        let (kind, target, reward_per_unit) = match archetype {
            0 => (ChallengeKind::CatchCount, roll_range(rng, 2, 4), 15),
            1 => (ChallengeKind::WinBattles, roll_range(rng, 2, 3), 20),
            2 => {
                let element = Element::ALL[roll_index(rng, Element::ALL.len())];
                (ChallengeKind::CatchElement(element), roll_range(rng, 1, 2), 25)
            }
            _ => (ChallengeKind::CompleteMinigames, roll_range(rng, 3, 5), 10),
        };
        challenges.push(DailyChallenge {
            id: (day as u32).wrapping_mul(10) + slot as u32,
            kind,
            target,
            progress: 0,
            completed: false,
            claimed: false,
            reward: target * reward_per_unit,
        });
    }
    challenges
}

/// Route a progress delta to every incomplete challenge the signal matches,
/// clamping at the target. Completion does not auto-pay.
pub fn update_challenge_progress(daily: &mut DailyState, signal: ProgressSignal, amount: u32) {
    for challenge in daily.challenges.iter_mut().filter(|c| !c.completed) {
        let matched = match (challenge.kind, signal) {
            (ChallengeKind::CatchCount, ProgressSignal::Catch) => true,
            (ChallengeKind::WinBattles, ProgressSignal::WinBattle) => true,
            (ChallengeKind::CatchElement(want), ProgressSignal::CatchElement(got)) => want == got,
            (ChallengeKind::CompleteMinigames, ProgressSignal::Minigame) => true,
            _ => false,
        };
        if matched {
            challenge.progress = (challenge.progress + amount).min(challenge.target);
            challenge.completed = challenge.progress >= challenge.target;
        }
    }
}

/// Pay out one completed-but-unclaimed challenge. Already-claimed or
/// incomplete challenges are a no-op.
pub fn claim_challenge_reward(
    daily: &mut DailyState,
    profile: &mut PlayerProfile,
    id: u32,
) -> Option<u32> {
    let challenge = daily
        .challenges
        .iter_mut()
        .find(|c| c.id == id && c.completed && !c.claimed)?;
    challenge.claimed = true;
    let reward = challenge.reward;
    credit_currency(profile, reward);
    Some(reward)
}

/// Pay out every completed-but-unclaimed challenge; returns the total.
pub fn claim_all_challenge_rewards(daily: &mut DailyState, profile: &mut PlayerProfile) -> u32 {
    let ids: Vec<u32> = daily
        .challenges
        .iter()
        .filter(|c| c.completed && !c.claimed)
        .map(|c| c.id)
        .collect();
    ids.iter()
        .filter_map(|id| claim_challenge_reward(daily, profile, *id))
        .sum()
}

/// Milestone table keyed to the streak length being built toward.
fn streak_milestone(next_streak: u32) -> (u32, u8) {
    match next_streak {
        1 => (25, 0),
        3 => (60, 0),
        5 => (120, 1),
        n if n >= 7 && n % 7 == 0 => (250, 2),
        _ => (30, 0),
    }
}

/// Claim the daily streak reward: payable once per day, only once all 3
/// challenges are complete. Bonus energy clamps at the cap.
pub fn claim_streak_reward(
    daily: &DailyState,
    profile: &mut PlayerProfile,
) -> Option<StreakReward> {
    if profile.streak_claimed || !daily.all_completed() {
        return None;
    }
    let (currency, bonus_energy) = streak_milestone(profile.streak + 1);
    profile.streak_claimed = true;
    credit_currency(profile, currency);
    profile.energy = (profile.energy + bonus_energy).min(ENERGY_CAP);
    Some(StreakReward {
        currency,
        bonus_energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::hash_seed;
    use crate::simulation::time::SECS_PER_DAY;

    fn fresh(now: u64) -> (PlayerProfile, DailyState, u64) {
        let mut rng = hash_seed("daily_tests");
        let profile = PlayerProfile::new(now);
        let daily = DailyState {
            challenges: generate_challenges(&mut rng, day_index(now)),
        };
        (profile, daily, rng)
    }

    fn complete_all(daily: &mut DailyState) {
        for challenge in &mut daily.challenges {
            challenge.progress = challenge.target;
            challenge.completed = true;
        }
    }

    #[test]
    fn generated_sets_have_three_distinct_kinds() {
        let mut rng = hash_seed("gen");
        for day in 0..20 {
            let set = generate_challenges(&mut rng, day);
            assert_eq!(set.len(), CHALLENGE_COUNT);
            for (i, a) in set.iter().enumerate() {
                assert!(a.target > 0 && a.reward > 0);
                for b in &set[i + 1..] {
                    assert!(
                        std::mem::discriminant(&a.kind) != std::mem::discriminant(&b.kind),
                        "duplicate archetype on day {}",
                        day
                    );
                }
            }
        }
    }

    #[test]
    fn rollover_is_idempotent_within_a_day() {
        let (mut profile, mut daily, mut rng) = fresh(0);
        let next_day = SECS_PER_DAY + 3_600;
        assert!(ensure_daily_cycle(&mut profile, &mut daily, &mut rng, next_day));
        let profile_snapshot = profile.clone();
        let challenge_ids: Vec<u32> = daily.challenges.iter().map(|c| c.id).collect();

        assert!(!ensure_daily_cycle(&mut profile, &mut daily, &mut rng, next_day + 7_200));
        assert_eq!(profile.streak, profile_snapshot.streak);
        assert_eq!(profile.boss_energy_reset, profile_snapshot.boss_energy_reset);
        assert_eq!(
            daily.challenges.iter().map(|c| c.id).collect::<Vec<_>>(),
            challenge_ids
        );
    }

    #[test]
    fn streak_increments_only_when_all_were_completed() {
        let (mut profile, mut daily, mut rng) = fresh(0);
        complete_all(&mut daily);
        ensure_daily_cycle(&mut profile, &mut daily, &mut rng, SECS_PER_DAY);
        assert_eq!(profile.streak, 1);

        // New set is incomplete; next rollover resets.
        ensure_daily_cycle(&mut profile, &mut daily, &mut rng, 2 * SECS_PER_DAY);
        assert_eq!(profile.streak, 0);
    }

    #[test]
    fn multi_day_gap_breaks_the_streak_even_if_completed() {
        let (mut profile, mut daily, mut rng) = fresh(0);
        profile.streak = 4;
        complete_all(&mut daily);
        ensure_daily_cycle(&mut profile, &mut daily, &mut rng, 3 * SECS_PER_DAY);
        assert_eq!(profile.streak, 0);
    }

    #[test]
    fn rollover_refills_boss_energy_and_clears_claim_flag() {
        let (mut profile, mut daily, mut rng) = fresh(0);
        profile.boss_energy = 0;
        profile.streak_claimed = true;
        ensure_daily_cycle(&mut profile, &mut daily, &mut rng, SECS_PER_DAY);
        assert_eq!(profile.boss_energy, BOSS_ENERGY_CAP);
        assert!(!profile.streak_claimed);
    }

    #[test]
    fn progress_routes_by_kind_and_element_and_clamps() {
        let mut daily = DailyState {
            challenges: vec![
                DailyChallenge {
                    id: 1,
                    kind: ChallengeKind::CatchElement(Element::Fire),
                    target: 2,
                    progress: 0,
                    completed: false,
                    claimed: false,
                    reward: 50,
                },
                DailyChallenge {
                    id: 2,
                    kind: ChallengeKind::CatchCount,
                    target: 3,
                    progress: 0,
                    completed: false,
                    claimed: false,
                    reward: 45,
                },
            ],
        };
        update_challenge_progress(&mut daily, ProgressSignal::CatchElement(Element::Water), 1);
        assert_eq!(daily.challenges[0].progress, 0);

        update_challenge_progress(&mut daily, ProgressSignal::CatchElement(Element::Fire), 5);
        assert_eq!(daily.challenges[0].progress, 2);
        assert!(daily.challenges[0].completed);

        // A raw catch signal does not touch the element challenge.
        update_challenge_progress(&mut daily, ProgressSignal::Catch, 1);
        assert_eq!(daily.challenges[0].progress, 2);
        assert_eq!(daily.challenges[1].progress, 1);
    }

    #[test]
    fn claims_pay_once_and_ignore_incomplete() {
        let (mut profile, mut daily, _) = fresh(0);
        let id = daily.challenges[0].id;
        assert!(claim_challenge_reward(&mut daily, &mut profile, id).is_none());

        complete_all(&mut daily);
        let before = profile.currency;
        let reward = claim_challenge_reward(&mut daily, &mut profile, id).unwrap();
        assert_eq!(profile.currency, before + reward);
        assert!(claim_challenge_reward(&mut daily, &mut profile, id).is_none());

        let rest = claim_all_challenge_rewards(&mut daily, &mut profile);
        let expected: u32 = daily.challenges[1..].iter().map(|c| c.reward).sum();
        assert_eq!(rest, expected);
        assert_eq!(claim_all_challenge_rewards(&mut daily, &mut profile), 0);
    }

    #[test]
    fn streak_claim_pays_once_per_day() {
        let (mut profile, mut daily, _) = fresh(0);
        assert!(claim_streak_reward(&daily, &mut profile).is_none());

        complete_all(&mut daily);
        let before = profile.currency;
        let reward = claim_streak_reward(&daily, &mut profile).unwrap();
        assert_eq!(profile.currency, before + reward.currency);
        // Second attempt the same day is a no-op.
        assert!(claim_streak_reward(&daily, &mut profile).is_none());
        assert_eq!(profile.currency, before + reward.currency);
    }

    #[test]
    fn streak_milestones_escalate() {
        assert!(streak_milestone(1).0 > 0);
        assert!(streak_milestone(3).0 > streak_milestone(1).0);
        assert!(streak_milestone(5).0 > streak_milestone(3).0);
        assert!(streak_milestone(7).0 > streak_milestone(5).0);
        assert!(streak_milestone(14).1 > 0);
    }

    #[test]
    fn bonus_energy_clamps_at_cap() {
        let (mut profile, mut daily, _) = fresh(0);
        profile.streak = 4; // next milestone is 5: +1 energy
        profile.energy = ENERGY_CAP;
        complete_all(&mut daily);
        let reward = claim_streak_reward(&daily, &mut profile).unwrap();
        assert_eq!(reward.bonus_energy, 1);
        assert_eq!(profile.energy, ENERGY_CAP);
    }
}
