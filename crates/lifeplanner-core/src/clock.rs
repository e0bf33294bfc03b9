//! Wall-clock time source.
//!
//! The ad throttle needs both an instant (minimum spacing between ads) and a
//! local calendar day (daily cap). Both come from a [`Clock`] so tests can
//! pin time instead of sleeping.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of "now" for the engines.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in local time.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// The system clock, with day boundaries in the machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Day boundaries are evaluated in the clock's fixed offset, so a test can
/// place "now" just before or after local midnight deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A manual clock at `now`, with UTC day boundaries.
    pub fn at_utc(now: DateTime<Utc>) -> Self {
        Self::new(now.fixed_offset())
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<FixedOffset>> {
        // A poisoned clock still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().with_timezone(&Utc)
    }

    fn today(&self) -> NaiveDate {
        self.lock().date_naive()
    }
}

/// Render a day the way the daily ad counter stores it (`Sun Oct 18 2026`).
pub fn day_key(day: NaiveDate) -> String {
    day.format("%a %b %d %Y").to_string()
}
