//! Cache age policy.

use chrono::{DateTime, Duration, Utc};

/// Default maximum cache age in days.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// Decides whether a cached snapshot is still fresh.
///
/// A snapshot is fresh while it is strictly younger than `max_age`; at exactly
/// `max_age` it is already stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCachePolicy {
    max_age: Duration,
}

impl Default for FeedCachePolicy {
    fn default() -> Self {
        Self { max_age: Duration::days(DEFAULT_MAX_AGE_DAYS) }
    }
}

impl FeedCachePolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Whether a snapshot taken at `timestamp` is fresh at `now`.
    pub fn validate(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match timestamp.checked_add_signed(self.max_age) {
            Some(expires_at) => now < expires_at,
            // only reachable for timestamps at the far end of the calendar, i.e. in the future
            None => true,
        }
    }
}
