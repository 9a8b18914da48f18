//! Questline Core - Gamification progression engine
//!
//! This crate provides the domain types and operations for the progression
//! engine:
//! - Account progression (coins, XP, levels, streaks) and the leveling math
//! - Quest catalog with progress tracking, completion and chain unlocking
//! - Daily quest templates instantiated per calendar day
//! - Shop ledger with time-derived fulfillment and a bounded refund window
//! - Leaderboard ranked by lifetime earned coins
//!
//! All mutation is funneled through named operations on the domain types so
//! the invariants (monotonic `earned_coins`, `xp < xp_needed`, non-negative
//! balance) are enforced in one place. Nothing in this crate persists or
//! notifies; callers own persistence and synchronization.
//!
//! Wall-clock reads are parameterized by the [`Clock`] trait, so derived
//! values (fulfillment status, refund eligibility, calendar days) can be
//! tested with an injected [`FixedClock`] instead of real elapsed time.

pub mod catalog;
pub mod daily;
mod error;
pub mod exporter;
mod leaderboard;
mod progress;
mod quest;
pub mod shop;
pub mod time;

pub use catalog::{AdvanceOutcome, QuestCatalog};
pub use daily::{quests_for_day, DailyTemplate, DAILY_TEMPLATES};
pub use error::{Error, RefundDenial, Result};
pub use exporter::{ExportFormat, Exporter};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use progress::{ClaimOutcome, Progression, RewardOutcome, BASE_XP_NEEDED, DAILY_CLAIM_COINS};
pub use quest::{ChainLink, Quest, QuestCategory, QuestId, QuestKind, QuestRewards};
pub use shop::{
    fulfillment, Fulfillment, FulfillmentStatus, PurchaseId, PurchaseRecord, ShopCatalog,
    ShopItem, ShopLedger,
};
pub use time::{day_key, Clock, FixedClock, SystemClock};
