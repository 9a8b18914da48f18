//! Account snapshot and its wire format
//!
//! Snapshots travel as JSON. Every field carries a serde default, so a
//! snapshot written by an older (or newer) version of the schema still
//! decodes, with unknown fields ignored and missing fields filled from
//! defaults.

use crate::error::{Error, Result};
use questline_core::{Leaderboard, Progression, ShopLedger};
use serde::{Deserialize, Serialize};

/// A full serialized copy of the account state at one point in time
///
/// This is the unit of cross-view synchronization: views exchange whole
/// snapshots and compare them with strict equality, never merging
/// individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AccountSnapshot {
    pub progression: Progression,
    pub ledger: ShopLedger,
    pub leaderboard: Leaderboard,
}

impl AccountSnapshot {
    /// Starting state for an account with no persisted snapshot
    ///
    /// Fresh progression and an empty ledger, but the leaderboard comes
    /// pre-seeded with the portal's standing entries.
    pub fn first_run() -> Self {
        Self {
            leaderboard: Leaderboard::campus_default(),
            ..Self::default()
        }
    }
}

/// Serialize a snapshot to its stored JSON form
pub fn encode(snapshot: &AccountSnapshot) -> Result<Vec<u8>> {
    serde_json::to_vec(snapshot).map_err(|e| Error::Codec(e.to_string()))
}

/// Parse a stored snapshot, tolerating schema drift
///
/// Malformed input is an [`Error::MalformedSnapshot`]; callers recover by
/// keeping their current state. A decoded snapshot has its progression
/// invariants repaired before use.
pub fn decode(bytes: &[u8]) -> Result<AccountSnapshot> {
    let mut snapshot: AccountSnapshot =
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedSnapshot(e.to_string()))?;
    snapshot.progression.repair();
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_equality() {
        let mut snapshot = AccountSnapshot::default();
        snapshot.progression.grant_reward(120, 40);
        snapshot.leaderboard.record("me", 120);

        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_decode_fills_missing_fields_from_defaults() {
        // An old snapshot that only knew about progression, and an old
        // progression that predates streaks.
        let json = br#"{"progression":{"coins":40,"earned_coins":90,"level":2,"xp":10,"xp_needed":240}}"#;
        let snapshot = decode(json).unwrap();

        assert_eq!(snapshot.progression.coins, 40);
        assert_eq!(snapshot.progression.streak, 0);
        assert!(snapshot.ledger.records.is_empty());
        assert!(snapshot.leaderboard.entries().is_empty());
    }

    #[test]
    fn test_decode_repairs_invariants() {
        let json = br#"{"progression":{"coins":0,"level":0,"xp":500,"xp_needed":0}}"#;
        let snapshot = decode(json).unwrap();

        assert!(snapshot.progression.level >= 1);
        assert!(snapshot.progression.xp < snapshot.progression.xp_needed);
    }

    #[test]
    fn test_decode_bounds_corrupt_threshold() {
        // Valid JSON carrying a degenerate threshold still decodes in
        // bounded time, with the threshold repaired back above the base.
        let json = br#"{"progression":{"xp":1000000,"xp_needed":1}}"#;
        let snapshot = decode(json).unwrap();

        assert!(snapshot.progression.xp_needed >= 200);
        assert!(snapshot.progression.xp < snapshot.progression.xp_needed);
        assert!(snapshot.progression.level < 100);
    }

    #[test]
    fn test_first_run_seeds_standing_leaderboard() {
        let snapshot = AccountSnapshot::first_run();
        assert!(!snapshot.leaderboard.entries().is_empty());
        assert_eq!(snapshot.leaderboard.rank_of("Mika"), Some(0));
        assert_eq!(snapshot.progression, Progression::default());
    }

    #[test]
    fn test_decode_malformed_is_reported() {
        assert!(matches!(
            decode(b"{not json"),
            Err(Error::MalformedSnapshot(_))
        ));
    }
}
