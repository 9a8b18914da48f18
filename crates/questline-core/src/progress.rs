//! Account progression state and leveling math

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// XP threshold for level 1
pub const BASE_XP_NEEDED: u64 = 200;

/// Growth factor applied to the threshold on each level-up
pub const XP_CURVE_FACTOR: f64 = 1.2;

/// Coins granted by the once-per-day claim
pub const DAILY_CLAIM_COINS: u64 = 25;

/// The canonical account record
///
/// One per account, mirrored into the durable store as part of the snapshot.
/// Invariants enforced by the operations below:
/// - `xp < xp_needed` after every grant (renormalized across level-ups)
/// - `earned_coins` only ever increases; spending touches `coins` alone
/// - `coins` never goes negative (overdrafts are rejected up front)
///
/// Every field carries a serde default so snapshots written by an older
/// version still load, with missing fields filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Spendable balance
    pub coins: u64,
    /// Lifetime total, used for leaderboard ranking
    pub earned_coins: u64,
    /// Current level, starts at 1
    pub level: u32,
    /// Progress toward the next level
    pub xp: u64,
    /// Threshold for the current level
    pub xp_needed: u64,
    /// Consecutive active days
    pub streak: u32,
    /// Last day any earning activity happened
    pub last_active: NaiveDate,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            coins: 0,
            earned_coins: 0,
            level: 1,
            xp: 0,
            xp_needed: BASE_XP_NEEDED,
            streak: 0,
            last_active: NaiveDate::default(),
        }
    }
}

/// What a single `grant_reward` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOutcome {
    /// Coins added to both balances
    pub coins_granted: u64,
    /// XP added before renormalization
    pub xp_granted: u64,
    /// Full thresholds crossed by this grant
    pub levels_gained: u32,
    /// Level after the grant
    pub level: u32,
}

/// Result of a daily claim attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The claim went through
    Granted {
        coins: u64,
        reward: RewardOutcome,
    },
    /// Already claimed today; state unchanged
    AlreadyClaimed,
}

impl Progression {
    /// Grant coins and XP in one atomic step
    ///
    /// Both balances grow by `coins`; XP is then renormalized below the
    /// threshold, leveling up as many times as the grant covers. A single
    /// large reward crossing several thresholds produces several level-ups
    /// in this one call.
    pub fn grant_reward(&mut self, coins: u64, xp: u64) -> RewardOutcome {
        self.coins += coins;
        self.earned_coins += coins;
        self.xp += xp;

        let mut levels_gained = 0;
        while self.xp >= self.xp_needed {
            self.xp -= self.xp_needed;
            self.level += 1;
            self.xp_needed = next_threshold(self.xp_needed);
            levels_gained += 1;
        }

        RewardOutcome {
            coins_granted: coins,
            xp_granted: xp,
            levels_gained,
            level: self.level,
        }
    }

    /// Debit the spendable balance
    ///
    /// Rejects the whole operation when the balance is short; `earned_coins`
    /// is never touched by spending.
    pub fn spend(&mut self, cost: u64) -> Result<()> {
        if self.coins < cost {
            return Err(Error::InsufficientFunds {
                needed: cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        Ok(())
    }

    /// Claim the fixed daily coin reward, at most once per calendar day
    ///
    /// `last_claim` is the persisted idempotency key; a second claim on the
    /// same day reports [`ClaimOutcome::AlreadyClaimed`] without mutating
    /// anything.
    pub fn claim_daily(&mut self, last_claim: Option<NaiveDate>, today: NaiveDate) -> ClaimOutcome {
        if last_claim == Some(today) {
            return ClaimOutcome::AlreadyClaimed;
        }
        let reward = self.grant_reward(DAILY_CLAIM_COINS, 0);
        ClaimOutcome::Granted {
            coins: DAILY_CLAIM_COINS,
            reward,
        }
    }

    /// Record activity for streak upkeep
    ///
    /// Same-day calls are no-ops; the day after the last active day extends
    /// the streak, anything later restarts it at 1.
    pub fn touch(&mut self, today: NaiveDate) {
        if self.last_active == today {
            return;
        }
        self.streak = if self.last_active.succ_opt() == Some(today) {
            self.streak + 1
        } else {
            1
        };
        self.last_active = today;
    }

    /// Restore invariants after loading a drifted or hand-edited snapshot
    pub fn repair(&mut self) {
        if self.level == 0 {
            self.level = 1;
        }
        // Thresholds start at the base and only ever grow, so anything
        // smaller is corrupt. Clamping also keeps the renormalization loop
        // geometric for any `xp` value.
        if self.xp_needed < BASE_XP_NEEDED {
            self.xp_needed = BASE_XP_NEEDED;
        }
        while self.xp >= self.xp_needed {
            self.xp -= self.xp_needed;
            self.level += 1;
            self.xp_needed = next_threshold(self.xp_needed);
        }
    }
}

fn next_threshold(needed: u64) -> u64 {
    ((needed as f64 * XP_CURVE_FACTOR).round() as u64).max(needed.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_grant_without_level_up() {
        let mut p = Progression::default();
        let outcome = p.grant_reward(0, 150);

        assert_eq!(outcome.levels_gained, 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.xp, 150);
        assert_eq!(p.xp_needed, 200);
    }

    #[test]
    fn test_single_level_up_scenario() {
        // Documented reference scenario: one call crossing one threshold.
        let mut p = Progression::default();
        let outcome = p.grant_reward(150, 300);

        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 100);
        assert_eq!(p.xp_needed, 240); // round(200 * 1.2)
        assert_eq!(p.coins, 150);
        assert_eq!(p.earned_coins, 150);
    }

    #[test]
    fn test_multi_level_up_in_one_call() {
        // 200 + 240 + 288 = 728 XP clears three thresholds exactly.
        let mut p = Progression::default();
        let outcome = p.grant_reward(0, 750);

        assert_eq!(outcome.levels_gained, 3);
        assert_eq!(p.level, 4);
        assert_eq!(p.xp, 22);
        assert_eq!(p.xp_needed, 346); // round(288 * 1.2) = round(345.6)
        assert!(p.xp < p.xp_needed);
    }

    #[test]
    fn test_earned_coins_monotonic_across_spends() {
        let mut p = Progression::default();
        p.grant_reward(300, 0);
        p.spend(120).unwrap();
        p.grant_reward(50, 0);
        p.spend(200).unwrap();

        assert_eq!(p.coins, 30);
        assert_eq!(p.earned_coins, 350);
    }

    #[test]
    fn test_spend_overdraft_rejected() {
        let mut p = Progression::default();
        p.grant_reward(10, 0);

        let err = p.spend(11).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientFunds {
                needed: 11,
                available: 10
            }
        ));
        // Rejected operation left the balance untouched.
        assert_eq!(p.coins, 10);
    }

    #[test]
    fn test_claim_daily_once_per_day() {
        let mut p = Progression::default();
        let today = day("2026-04-01");

        let first = p.claim_daily(None, today);
        assert!(matches!(first, ClaimOutcome::Granted { coins, .. } if coins == DAILY_CLAIM_COINS));
        assert_eq!(p.coins, DAILY_CLAIM_COINS);

        let second = p.claim_daily(Some(today), today);
        assert_eq!(second, ClaimOutcome::AlreadyClaimed);
        assert_eq!(p.coins, DAILY_CLAIM_COINS);

        let next = p.claim_daily(Some(today), day("2026-04-02"));
        assert!(matches!(next, ClaimOutcome::Granted { .. }));
        assert_eq!(p.coins, DAILY_CLAIM_COINS * 2);
    }

    #[test]
    fn test_touch_streak() {
        let mut p = Progression::default();

        p.touch(day("2026-04-01"));
        assert_eq!(p.streak, 1);

        // Same day is a no-op.
        p.touch(day("2026-04-01"));
        assert_eq!(p.streak, 1);

        p.touch(day("2026-04-02"));
        assert_eq!(p.streak, 2);

        // A gap resets the streak.
        p.touch(day("2026-04-05"));
        assert_eq!(p.streak, 1);
        assert_eq!(p.last_active, day("2026-04-05"));
    }

    #[test]
    fn test_next_threshold_strictly_increases() {
        assert!(next_threshold(1) > 1);
        assert!(next_threshold(2) > 2);
        assert_eq!(next_threshold(200), 240);
    }

    #[test]
    fn test_repair_bounds_loop_on_corrupt_threshold() {
        // A tiny stored threshold must not make renormalization linear in
        // the XP value (or run the level counter away).
        let mut p = Progression {
            xp: 1_000_000,
            xp_needed: 1,
            ..Progression::default()
        };
        p.repair();

        assert!(p.xp_needed >= BASE_XP_NEEDED);
        assert!(p.xp < p.xp_needed);
        assert!(p.level >= 1 && p.level < 100);
    }

    #[test]
    fn test_repair_restores_invariants() {
        let mut p = Progression {
            level: 0,
            xp: 500,
            xp_needed: 0,
            ..Progression::default()
        };
        p.repair();

        assert!(p.level >= 1);
        assert!(p.xp_needed >= 1);
        assert!(p.xp < p.xp_needed);
    }
}
