//! Clock abstraction for time-derived state
//!
//! Fulfillment status, refund eligibility and calendar-day keys are pure
//! functions of "now". Operations take a [`Clock`] instead of reading the
//! wall clock directly, so tests drive time with a [`FixedClock`].

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// A source of the current instant
pub trait Clock: Send + Sync {
    /// The current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock for tests and simulations
///
/// Stores the instant as Unix milliseconds so the clock can be shared
/// behind an `Arc` and advanced without exterior mutability.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at the given instant
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(now.timestamp_millis()),
        }
    }

    /// Create a clock frozen at noon UTC on the given calendar day
    ///
    /// An out-of-range date falls back to the Unix epoch.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        let noon = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_default();
        Self::new(noon)
    }

    /// Jump to a specific instant
    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::Relaxed);
    }

    /// Move the clock forward (or backward, with a negative delta)
    pub fn advance(&self, delta: Duration) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::Relaxed)).unwrap_or_default()
    }
}

/// Stable calendar-day key, `YYYY-MM-DD`
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
