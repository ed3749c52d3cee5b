use chrono::{DateTime, Duration, Utc};

/// Length of the visible publishing window.
pub const WINDOW_HOURS: i64 = 24;

/// Source of "now" for queries and formatting.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests and reproducible renders.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_millis(epoch_millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(epoch_millis).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Epoch milliseconds for "24 hours ago", read fresh from `clock` on every call.
pub fn cutoff_millis(clock: &dyn Clock) -> i64 {
    (clock.now() - Duration::hours(WINDOW_HOURS)).timestamp_millis()
}
