//! Quest records and identity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a quest
///
/// String-based so daily quests can embed their calendar day and template
/// slug directly in the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl QuestId {
    /// Create a new quest ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for QuestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a quest recurs (or does not)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    #[default]
    Normal,
    Daily,
    Weekly,
    Urgent,
    Chain,
}

/// Broad grouping used by the presentation layer to pick decoration
///
/// Only the category is persisted; icons and colors are attached at render
/// time from `id`/`category` and never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestCategory {
    #[default]
    General,
    Study,
    Social,
    Campus,
    Fitness,
}

/// What completing a quest grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuestRewards {
    pub coins: u64,
    pub xp: u64,
    pub items: Vec<String>,
    pub badges: Vec<String>,
}

impl QuestRewards {
    /// Coin-and-XP reward with no items or badges
    pub fn new(coins: u64, xp: u64) -> Self {
        Self {
            coins,
            xp,
            ..Self::default()
        }
    }
}

/// Position of a quest inside an ordered chain
///
/// Quests sharing a `chain_id` form a sequence; completing step N unlocks
/// step N+1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub chain_id: String,
    pub step: u32,
}

/// A single quest
///
/// Created at catalog initialization or by the daily generator, mutated only
/// through progress and unlock operations, never deleted. `completed` is a
/// one-way transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub category: QuestCategory,
    pub kind: QuestKind,
    /// Progress, `0 ≤ current ≤ total`
    pub current: u32,
    pub total: u32,
    pub completed: bool,
    /// Gates interaction; chain steps past the first start locked
    pub unlocked: bool,
    pub rewards: QuestRewards,
    pub chain: Option<ChainLink>,
    pub deadline: Option<DateTime<Utc>>,
    pub required_level: Option<u32>,
}

impl Default for Quest {
    fn default() -> Self {
        Self {
            id: QuestId::new(""),
            title: String::new(),
            description: String::new(),
            category: QuestCategory::default(),
            kind: QuestKind::default(),
            current: 0,
            total: 1,
            completed: false,
            unlocked: false,
            rewards: QuestRewards::default(),
            chain: None,
            deadline: None,
            required_level: None,
        }
    }
}

impl Quest {
    /// Create an unlocked single-step quest; refine with the `with_` methods
    pub fn new(
        id: impl Into<QuestId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            unlocked: true,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: QuestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: QuestCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_total(mut self, total: u32) -> Self {
        self.total = total.max(1);
        self
    }

    pub fn with_rewards(mut self, coins: u64, xp: u64) -> Self {
        self.rewards = QuestRewards::new(coins, xp);
        self
    }

    pub fn with_chain(mut self, chain_id: impl Into<String>, step: u32) -> Self {
        self.chain = Some(ChainLink {
            chain_id: chain_id.into(),
            step,
        });
        self.kind = QuestKind::Chain;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = Some(level);
        self
    }

    /// Start the quest locked (chain steps past the first, gated content)
    pub fn locked(mut self) -> Self {
        self.unlocked = false;
        self
    }

    /// Whether the deadline, if any, has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_quest_id() {
        let id = QuestId::new("daily/2026-03-01/lecture");
        assert_eq!(id.as_str(), "daily/2026-03-01/lecture");
        assert_eq!(format!("{}", id), "daily/2026-03-01/lecture");
    }

    #[test]
    fn test_quest_builder() {
        let q = Quest::new("orientation-1", "Find the lecture hall", "Week one basics")
            .with_chain("orientation", 1)
            .with_rewards(40, 60)
            .with_total(3);

        assert_eq!(q.kind, QuestKind::Chain);
        assert_eq!(q.total, 3);
        assert_eq!(q.rewards.coins, 40);
        assert!(q.unlocked);
        assert!(!q.completed);
    }

    #[test]
    fn test_quest_expiry() {
        let now = chrono::DateTime::UNIX_EPOCH + Duration::days(100);
        let q = Quest::new("q", "t", "d").with_deadline(now + Duration::hours(24));

        assert!(!q.is_expired(now));
        assert!(!q.is_expired(now + Duration::hours(24)));
        assert!(q.is_expired(now + Duration::hours(25)));
    }

    #[test]
    fn test_quest_serde_defaults_tolerate_drift() {
        // A record written before deadlines/chains existed still loads.
        let json = r#"{"id":"old","title":"Old quest","current":1,"total":2,"unlocked":true}"#;
        let q: Quest = serde_json::from_str(json).unwrap();

        assert_eq!(q.id.as_str(), "old");
        assert_eq!(q.current, 1);
        assert!(q.chain.is_none());
        assert!(q.deadline.is_none());
        assert_eq!(q.rewards, QuestRewards::default());
    }
}
