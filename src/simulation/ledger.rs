//! Soft currency and the time-regenerating encounter-energy pool.
//!
//! Insufficient funds or energy are expected outcomes and come back as
//! booleans; nothing here errors.

use crate::simulation::profile::{PlayerProfile, ENERGY_CAP};

/// One energy unit regenerates every 10 minutes.
pub const ENERGY_REGEN_SECS: u64 = 600;

/// Unconditional add.
pub fn credit_currency(profile: &mut PlayerProfile, amount: u32) {
    profile.currency = profile.currency.saturating_add(amount);
}

/// Decrement only if the full amount is available. No partial debit.
pub fn debit_currency(profile: &mut PlayerProfile, amount: u32) -> bool {
    if profile.currency < amount {
        return false;
    }
    profile.currency -= amount;
    true
}

/// Apply whole regen intervals elapsed since the checkpoint, up to the cap.
///
/// The checkpoint advances by exactly the whole-interval span consumed, so a
/// fractional remainder carries into the next reconcile instead of being
/// discarded. At the cap the checkpoint snaps to `now`; banked idle time must
/// not refill energy the instant one unit is spent. Returns units gained.
pub fn reconcile_energy(profile: &mut PlayerProfile, now: u64) -> u8 {
    if profile.energy >= ENERGY_CAP {
        profile.energy_checkpoint = now;
        return 0;
    }
    let elapsed = now.saturating_sub(profile.energy_checkpoint);
    let units = elapsed / ENERGY_REGEN_SECS;
    if units == 0 {
        return 0;
    }
    let missing = (ENERGY_CAP - profile.energy) as u64;
    let applied = units.min(missing);
    profile.energy += applied as u8;
    if profile.energy >= ENERGY_CAP {
        profile.energy_checkpoint = now;
    } else {
        profile.energy_checkpoint += applied * ENERGY_REGEN_SECS;
    }
    applied as u8
}

/// Reconcile, then spend one unit if any is available.
pub fn spend_energy(profile: &mut PlayerProfile, now: u64) -> bool {
    reconcile_energy(profile, now);
    if profile.energy == 0 {
        return false;
    }
    // Leaving the cap starts the regen timer from this moment.
    if profile.energy == ENERGY_CAP {
        profile.energy_checkpoint = now;
    }
    profile.energy -= 1;
    true
}

/// Spend the single daily boss-energy unit. Regeneration is day-based and
/// owned by the daily cycle, not by elapsed-interval reconciliation.
pub fn spend_boss_energy(profile: &mut PlayerProfile) -> bool {
    if profile.boss_energy == 0 {
        return false;
    }
    profile.boss_energy -= 1;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::profile::ENERGY_CAP;

    fn empty_profile(now: u64) -> PlayerProfile {
        let mut profile = PlayerProfile::new(now);
        profile.energy = 0;
        profile.energy_checkpoint = now;
        profile
    }

    #[test]
    fn debit_refuses_without_side_effect() {
        let mut profile = PlayerProfile::new(0);
        profile.currency = 30;
        assert!(!debit_currency(&mut profile, 31));
        assert_eq!(profile.currency, 30);
        assert!(debit_currency(&mut profile, 30));
        assert_eq!(profile.currency, 0);
    }

    #[test]
    fn regen_preserves_fractional_remainder() {
        // 25 minutes at a 10-minute interval: 2 units, 5 minutes carried over.
        let mut profile = empty_profile(1_000);
        let gained = reconcile_energy(&mut profile, 1_000 + 25 * 60);
        assert_eq!(gained, 2);
        assert_eq!(profile.energy, 2);
        assert_eq!(profile.energy_checkpoint, 1_000 + 20 * 60);

        // 5 more minutes completes the third interval.
        let gained = reconcile_energy(&mut profile, 1_000 + 30 * 60);
        assert_eq!(gained, 1);
        assert_eq!(profile.energy, 3);
    }

    #[test]
    fn regen_never_exceeds_cap_or_elapsed_intervals() {
        let mut profile = empty_profile(0);
        let gained = reconcile_energy(&mut profile, ENERGY_REGEN_SECS * 100);
        assert_eq!(gained, ENERGY_CAP);
        assert_eq!(profile.energy, ENERGY_CAP);

        let mut profile = empty_profile(0);
        reconcile_energy(&mut profile, ENERGY_REGEN_SECS * 3 + 17);
        assert_eq!(profile.energy, 3);
    }

    #[test]
    fn capped_energy_snaps_checkpoint_forward() {
        let mut profile = PlayerProfile::new(0);
        assert_eq!(profile.energy, ENERGY_CAP);
        reconcile_energy(&mut profile, ENERGY_REGEN_SECS * 6);
        assert_eq!(profile.energy_checkpoint, ENERGY_REGEN_SECS * 6);

        // Spending right after a long idle must not instantly refill.
        assert!(spend_energy(&mut profile, ENERGY_REGEN_SECS * 6 + 1));
        assert_eq!(profile.energy, ENERGY_CAP - 1);
        reconcile_energy(&mut profile, ENERGY_REGEN_SECS * 6 + 2);
        assert_eq!(profile.energy, ENERGY_CAP - 1);
    }

    #[test]
    fn spend_fails_at_zero_after_reconcile() {
        let mut profile = empty_profile(0);
        assert!(!spend_energy(&mut profile, ENERGY_REGEN_SECS - 1));
        assert_eq!(profile.energy, 0);
        assert!(spend_energy(&mut profile, ENERGY_REGEN_SECS));
        assert_eq!(profile.energy, 0);
    }

    #[test]
    fn two_short_sessions_accumulate_regen() {
        let mut profile = empty_profile(0);
        reconcile_energy(&mut profile, 9 * 60);
        assert_eq!(profile.energy, 0);
        // Second session 2 minutes later: the 9 idle minutes still count.
        reconcile_energy(&mut profile, 11 * 60);
        assert_eq!(profile.energy, 1);
    }

    #[test]
    fn boss_energy_spends_once() {
        let mut profile = PlayerProfile::new(0);
        assert!(spend_boss_energy(&mut profile));
        assert!(!spend_boss_energy(&mut profile));
    }
}
