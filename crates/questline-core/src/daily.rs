//! Daily quest templates
//!
//! The rotating daily subset comes from a small fixed template list,
//! instantiated once per calendar day. The template set is deliberately
//! fixed rather than randomized; the schedule is the calendar day itself.

use crate::quest::{Quest, QuestCategory, QuestId, QuestKind};
use crate::time::day_key;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Hours a daily quest stays open after generation
pub const DAILY_QUEST_LIFETIME_HOURS: i64 = 24;

/// A daily quest blueprint
#[derive(Debug, Clone, Copy)]
pub struct DailyTemplate {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: QuestCategory,
    pub total: u32,
    pub coins: u64,
    pub xp: u64,
}

/// The fixed per-day template list
pub const DAILY_TEMPLATES: [DailyTemplate; 4] = [
    DailyTemplate {
        slug: "lecture",
        title: "Show up",
        description: "Attend today's lecture",
        category: QuestCategory::Study,
        total: 1,
        coins: 15,
        xp: 20,
    },
    DailyTemplate {
        slug: "flashcards",
        title: "Quick review",
        description: "Review two flashcard decks",
        category: QuestCategory::Study,
        total: 2,
        coins: 10,
        xp: 15,
    },
    DailyTemplate {
        slug: "forum",
        title: "Say hello",
        description: "Post once in a course forum",
        category: QuestCategory::Social,
        total: 1,
        coins: 10,
        xp: 10,
    },
    DailyTemplate {
        slug: "library",
        title: "Stacks run",
        description: "Check in at the library",
        category: QuestCategory::Campus,
        total: 1,
        coins: 5,
        xp: 10,
    },
];

/// Instantiate the template list into concrete quests for one calendar day
///
/// Pure: the same `(day, now)` always produces the same set. Idempotence
/// across calls and reloads is the caller's job, keyed by the day.
pub fn quests_for_day(day: NaiveDate, now: DateTime<Utc>) -> Vec<Quest> {
    let deadline = now + Duration::hours(DAILY_QUEST_LIFETIME_HOURS);
    DAILY_TEMPLATES
        .iter()
        .map(|t| {
            Quest::new(
                QuestId::new(format!("daily/{}/{}", day_key(day), t.slug)),
                t.title,
                t.description,
            )
            .with_kind(QuestKind::Daily)
            .with_category(t.category)
            .with_total(t.total)
            .with_rewards(t.coins, t.xp)
            .with_deadline(deadline)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn noon(d: NaiveDate) -> DateTime<Utc> {
        d.and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    #[test]
    fn test_quests_for_day_shape() {
        let d = day("2026-03-01");
        let quests = quests_for_day(d, noon(d));

        assert_eq!(quests.len(), DAILY_TEMPLATES.len());
        for q in &quests {
            assert_eq!(q.kind, QuestKind::Daily);
            assert!(q.unlocked);
            assert!(!q.completed);
            assert_eq!(q.current, 0);
            assert_eq!(q.deadline, Some(noon(d) + Duration::hours(24)));
            assert!(q.id.as_str().starts_with("daily/2026-03-01/"));
        }
    }

    #[test]
    fn test_same_day_is_deterministic() {
        let d = day("2026-03-01");
        assert_eq!(quests_for_day(d, noon(d)), quests_for_day(d, noon(d)));
    }

    #[test]
    fn test_new_day_changes_ids() {
        let d1 = day("2026-03-01");
        let d2 = day("2026-03-02");
        let ids1: Vec<_> = quests_for_day(d1, noon(d1)).into_iter().map(|q| q.id).collect();
        let ids2: Vec<_> = quests_for_day(d2, noon(d2)).into_iter().map(|q| q.id).collect();

        assert!(ids1.iter().all(|id| !ids2.contains(id)));
    }
}
