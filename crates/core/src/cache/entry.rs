//! Timestamped cache entries.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A stored value with the instant it was written and its time-to-live.
///
/// Entries are immutable; replacing a key stores a whole new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl<T> CacheEntry<T> {
    /// Create an entry stored now. A zero TTL is raised to one second.
    pub fn new(data: T, ttl_seconds: u64) -> Self {
        Self::stored_at(data, Utc::now(), ttl_seconds)
    }

    /// Create an entry with an explicit write time, e.g. when restoring a warm cache.
    pub fn stored_at(data: T, stored_at: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self { data, stored_at, ttl_seconds: ttl_seconds.max(1) }
    }

    pub fn ttl(&self) -> TimeDelta {
        let secs = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX)
    }

    /// Time since the entry was written, as seen at `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.stored_at
    }

    /// Fresh iff `now - stored_at <= ttl`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) <= self.ttl()
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.stored_at.checked_add_signed(self.ttl()).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
