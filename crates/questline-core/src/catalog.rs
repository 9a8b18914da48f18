//! Quest catalog: progress, completion, chain unlocking

use crate::progress::{Progression, RewardOutcome};
use crate::quest::{ChainLink, Quest, QuestCategory, QuestId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Result of an `advance` call
///
/// Rejections are reported, not raised: a missing, locked, completed, gated,
/// expired or in-flight quest leaves all state untouched and the caller
/// decides whether anyone needs to hear about it.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Progress moved but the quest is not done yet
    Progressed { current: u32, total: u32 },
    /// The quest completed; reward granted exactly once
    Completed {
        reward: RewardOutcome,
        /// Next chain step unlocked by this completion, if any
        unlocked_next: Option<QuestId>,
    },
    /// No quest with that id
    NotFound,
    /// Quest exists but is locked
    Locked,
    /// Account level below the quest's requirement
    LevelGated { required: u32 },
    /// Deadline has passed
    Expired,
    /// Already completed; progress and rewards unchanged
    AlreadyCompleted,
    /// An advance for this id is still unsettled
    InFlight,
}

impl AdvanceOutcome {
    /// Whether this outcome changed any state
    pub fn mutated(&self) -> bool {
        matches!(
            self,
            AdvanceOutcome::Progressed { .. } | AdvanceOutcome::Completed { .. }
        )
    }
}

/// The set of known quests for one account
///
/// Quests are keyed by id in insertion order. The `in_flight` markers model
/// debounced duplicate triggers: while an advance for an id is unsettled, a
/// second advance for the same id is rejected.
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: IndexMap<QuestId, Quest>,
    in_flight: HashSet<QuestId>,
}

impl QuestCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from an initial quest list
    pub fn with_quests(quests: impl IntoIterator<Item = Quest>) -> Self {
        let mut catalog = Self::new();
        for quest in quests {
            catalog.insert(quest);
        }
        catalog
    }

    /// The static campus quest list every account starts with
    ///
    /// Includes a three-step orientation chain (later steps locked) and a
    /// level-gated quest, so every unlock path is represented.
    pub fn campus_default() -> Self {
        Self::with_quests([
            Quest::new("attend-lectures", "Full house", "Attend 5 lectures")
                .with_category(QuestCategory::Study)
                .with_total(5)
                .with_rewards(50, 80),
            Quest::new("forum-posts", "Join the conversation", "Post 3 times in course forums")
                .with_category(QuestCategory::Social)
                .with_total(3)
                .with_rewards(30, 45),
            Quest::new(
                "orientation-1",
                "Find your way",
                "Locate the main lecture hall",
            )
            .with_category(QuestCategory::Campus)
            .with_chain("orientation", 1)
            .with_rewards(20, 30),
            Quest::new(
                "orientation-2",
                "Meet the mentors",
                "Introduce yourself to your study group",
            )
            .with_category(QuestCategory::Campus)
            .with_chain("orientation", 2)
            .with_rewards(30, 45)
            .locked(),
            Quest::new(
                "orientation-3",
                "Campus veteran",
                "Complete the full orientation tour",
            )
            .with_category(QuestCategory::Campus)
            .with_chain("orientation", 3)
            .with_rewards(60, 90)
            .locked(),
            Quest::new("senior-seminar", "Senior seminar", "Attend an advanced seminar")
                .with_category(QuestCategory::Study)
                .with_rewards(80, 120)
                .with_required_level(3),
        ])
    }

    /// Insert or replace a quest by id
    pub fn insert(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    /// Insert a quest only if the id is not already tracked
    ///
    /// Daily sets are persisted at creation time with zero progress; loading
    /// them again must not clobber progress made since.
    pub fn insert_if_absent(&mut self, quest: Quest) {
        self.quests.entry(quest.id.clone()).or_insert(quest);
    }

    /// Get a quest by id
    pub fn get(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.get(id)
    }

    /// Iterate over all quests in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Number of tracked quests
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Advance a quest by one step and settle immediately
    ///
    /// Progress update, completion, reward grant and chain unlock all happen
    /// within this one call; no observer can see a completed quest whose
    /// reward has not been applied.
    pub fn advance(
        &mut self,
        id: &QuestId,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> AdvanceOutcome {
        let outcome = self.advance_deferred(id, progression, now);
        self.settle(id);
        outcome
    }

    /// Advance a quest by one step, leaving the in-flight marker set
    ///
    /// The caller must [`settle`](Self::settle) the id afterwards; until
    /// then, further advances for the same id report
    /// [`AdvanceOutcome::InFlight`]. This is how rapid duplicate triggers
    /// (a double click re-fired before the UI settles) are absorbed.
    pub fn advance_deferred(
        &mut self,
        id: &QuestId,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> AdvanceOutcome {
        if self.in_flight.contains(id) {
            return AdvanceOutcome::InFlight;
        }

        let quest = match self.quests.get(id) {
            Some(quest) => quest,
            None => return AdvanceOutcome::NotFound,
        };
        if quest.completed {
            return AdvanceOutcome::AlreadyCompleted;
        }
        if !quest.unlocked {
            return AdvanceOutcome::Locked;
        }
        if let Some(required) = quest.required_level {
            if progression.level < required {
                return AdvanceOutcome::LevelGated { required };
            }
        }
        if quest.is_expired(now) {
            return AdvanceOutcome::Expired;
        }

        self.in_flight.insert(id.clone());

        let (current, total, completed_now, rewards, chain) = {
            let quest = match self.quests.get_mut(id) {
                Some(quest) => quest,
                None => return AdvanceOutcome::NotFound,
            };
            quest.current = (quest.current + 1).min(quest.total);
            let completed_now = quest.current >= quest.total;
            if completed_now {
                quest.completed = true;
            }
            (
                quest.current,
                quest.total,
                completed_now,
                quest.rewards.clone(),
                quest.chain.clone(),
            )
        };

        if !completed_now {
            return AdvanceOutcome::Progressed { current, total };
        }

        // Coins fold into the XP grant on completion. Intentional coupling:
        // coins earned from quests double as an XP source.
        let reward = progression.grant_reward(rewards.coins, rewards.xp + rewards.coins);
        let unlocked_next = chain.and_then(|link| self.unlock_next_step(&link));

        AdvanceOutcome::Completed {
            reward,
            unlocked_next,
        }
    }

    /// Clear the in-flight marker for a quest id
    pub fn settle(&mut self, id: &QuestId) {
        self.in_flight.remove(id);
    }

    fn unlock_next_step(&mut self, link: &ChainLink) -> Option<QuestId> {
        let next = self.quests.values_mut().find(|q| {
            q.chain
                .as_ref()
                .is_some_and(|c| c.chain_id == link.chain_id && c.step == link.step + 1)
        })?;
        next.unlocked = true;
        Some(next.id.clone())
    }
}
