//! Leaderboard ranked by lifetime earned coins

use serde::{Deserialize, Serialize};

/// One row on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub coins: u64,
}

/// The coin leaderboard
///
/// Ranking uses `earned_coins`, so spending never moves anyone down. The
/// list is re-sorted descending after every update; ties keep their
/// existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The board seeded with the portal's standing entries
    pub fn campus_default() -> Self {
        let mut board = Self::new();
        board.record("Mika", 820);
        board.record("Jordan", 445);
        board.record("Sam", 150);
        board
    }

    /// Upsert an entry and re-sort
    ///
    /// Called whenever an account's `earned_coins` changes.
    pub fn record(&mut self, name: &str, coins: u64) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.coins = coins,
            None => self.entries.push(LeaderboardEntry {
                name: name.to_string(),
                coins,
            }),
        }
        self.entries.sort_by(|a, b| b.coins.cmp(&a.coins));
    }

    /// Entries in rank order
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Zero-based rank of a name, if present
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}
