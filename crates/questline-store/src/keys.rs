//! Key layout for the account store
//!
//! Fixed keys for singleton values, a parameterized key per calendar day for
//! daily quest sets.

use chrono::NaiveDate;

/// JSON-serialized account snapshot (progression, ledger, leaderboard)
pub const SNAPSHOT: &str = "account/snapshot";

/// ISO date string of the last daily-claim day
pub const LAST_DAILY_CLAIM: &str = "account/last-daily-claim";

/// JSON array of quest records for one calendar day
pub fn daily(day: NaiveDate) -> String {
    format!("quests/daily/{}", day.format("%Y-%m-%d"))
}
