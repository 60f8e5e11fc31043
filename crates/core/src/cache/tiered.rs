//! In-memory tiered cache with a long-lived backup slot per key.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use super::entry::CacheEntry;
use super::key::{backup_key, is_backup_key};

/// Result of [`TieredCache::get_with_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRead<T> {
    pub value: T,
    /// True when the value came from the backup slot.
    pub is_stale: bool,
}

/// Point-in-time counts over the whole map, backup slots included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub backups: usize,
}

struct Slot<T> {
    entry: CacheEntry<T>,
    generation: u64,
}

struct Inner<T> {
    slots: HashMap<String, Slot<T>>,
    next_generation: u64,
}

impl<T> Inner<T> {
    fn insert(&mut self, key: String, entry: CacheEntry<T>) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.slots.insert(key, Slot { entry, generation });
    }

    /// Drop least-recently-set slots until at most `max` remain.
    fn reclaim(&mut self, max: usize) -> usize {
        let mut evicted = 0;
        while self.slots.len() > max {
            let oldest = self
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.generation)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.slots.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }
}

/// In-memory key/value store with per-entry TTL and graceful degradation.
///
/// Cloning yields another handle to the same map. Reads past TTL behave as
/// misses, but the bytes stay in memory so [`get_stale`](Self::get_stale)
/// can still serve them when the origin is down. No operation errors.
pub struct TieredCache<T> {
    inner: Arc<RwLock<Inner<T>>>,
    max_entries: Option<usize>,
}

impl<T> Clone for TieredCache<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), max_entries: self.max_entries }
    }
}

impl<T> Default for TieredCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TieredCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache").field("max_entries", &self.max_entries).finish()
    }
}

impl<T> TieredCache<T> {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner { slots: HashMap::new(), next_generation: 0 })), max_entries: None }
    }

    /// Create a cache that reclaims the least-recently-set entries past `max_entries`.
    ///
    /// The bound is raised to 2 so a key and its backup always fit together.
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self { max_entries: Some(max_entries.max(2)), ..Self::new() }
    }

    async fn write_entries(&self, entries: Vec<(String, CacheEntry<T>)>) {
        let mut inner = self.inner.write().await;
        for (key, entry) in entries {
            inner.insert(key, entry);
        }
        if let Some(max) = self.max_entries {
            let evicted = inner.reclaim(max);
            if evicted > 0 {
                tracing::debug!(evicted, max, "reclaimed least-recently-set cache entries");
            }
        }
    }

    /// Store `value` under `key` for `ttl_seconds`, replacing any previous entry.
    pub async fn set(&self, key: &str, value: T, ttl_seconds: u64) {
        self.write_entries(vec![(key.to_string(), CacheEntry::new(value, ttl_seconds))])
            .await;
    }

    /// Insert a prebuilt entry, keeping its original write time.
    pub async fn restore(&self, key: &str, entry: CacheEntry<T>) {
        self.write_entries(vec![(key.to_string(), entry)]).await;
    }

    /// True iff `key` was set and its entry is past TTL.
    pub async fn is_stale(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.slots.get(key).is_some_and(|slot| !slot.entry.is_fresh())
    }

    /// Remove `key` (not its backup). Returns whether an entry existed.
    pub async fn remove(&self, key: &str) -> bool {
        self.inner.write().await.slots.remove(key).is_some()
    }

    /// Drop every entry past its TTL, backups included. Returns the number dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let before = inner.slots.len();
        inner.slots.retain(|_, slot| slot.entry.is_fresh_at(now));
        before - inner.slots.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.slots.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let inner = self.inner.read().await;
        let mut stats = CacheStats { entries: inner.slots.len(), ..Default::default() };
        for (key, slot) in &inner.slots {
            if is_backup_key(key) {
                stats.backups += 1;
            }
            if slot.entry.is_fresh_at(now) {
                stats.fresh += 1;
            } else {
                stats.stale += 1;
            }
        }
        stats
    }
}

impl<T: Clone> TieredCache<T> {
    /// Value under `key` if it is within TTL.
    pub async fn get(&self, key: &str) -> Option<T> {
        let inner = self.inner.read().await;
        inner
            .slots
            .get(key)
            .filter(|slot| slot.entry.is_fresh())
            .map(|slot| slot.entry.data.clone())
    }

    /// Full entry under `key`, regardless of freshness.
    pub async fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        let inner = self.inner.read().await;
        inner.slots.get(key).map(|slot| slot.entry.clone())
    }

    /// Write `key` and `key:backup` together under one lock.
    ///
    /// The backup TTL is raised to the primary TTL if it is shorter.
    pub async fn set_with_degradation(&self, key: &str, value: T, primary_ttl: u64, backup_ttl: u64) {
        let backup_ttl = backup_ttl.max(primary_ttl);
        let primary = CacheEntry::new(value, primary_ttl);
        let backup = CacheEntry::stored_at(primary.data.clone(), primary.stored_at, backup_ttl);
        self.write_entries(vec![(key.to_string(), primary), (backup_key(key), backup)])
            .await;
    }

    /// Fresh `key`, else a live `key:backup` marked stale, else `None`.
    pub async fn get_with_fallback(&self, key: &str) -> Option<FallbackRead<T>> {
        let now = Utc::now();
        let inner = self.inner.read().await;

        if let Some(slot) = inner.slots.get(key)
            && slot.entry.is_fresh_at(now)
        {
            return Some(FallbackRead { value: slot.entry.data.clone(), is_stale: false });
        }

        inner
            .slots
            .get(&backup_key(key))
            .filter(|slot| slot.entry.is_fresh_at(now))
            .map(|slot| FallbackRead { value: slot.entry.data.clone(), is_stale: true })
    }

    /// Any retained bytes for `key`, ignoring TTL: primary first, then backup.
    pub async fn get_stale(&self, key: &str) -> Option<T> {
        let inner = self.inner.read().await;
        inner
            .slots
            .get(key)
            .or_else(|| inner.slots.get(&backup_key(key)))
            .map(|slot| slot.entry.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::time::Duration;

    fn expired_entry(value: &str, ttl_seconds: u64) -> CacheEntry<String> {
        let stored_at = Utc::now() - TimeDelta::seconds(ttl_seconds as i64 + 5);
        CacheEntry::stored_at(value.to_string(), stored_at, ttl_seconds)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = TieredCache::new();
        cache.set("page:buttons", "v1".to_string(), 60).await;
        assert_eq!(cache.get("page:buttons").await.as_deref(), Some("v1"));
        assert!(!cache.is_stale("page:buttons").await);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = TieredCache::new();
        cache.set("k", "v1".to_string(), 60).await;
        cache.set("k", "v2".to_string(), 60).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v2"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_never_seen_is_not_stale() {
        let cache: TieredCache<String> = TieredCache::new();
        assert!(cache.get("missing").await.is_none());
        assert!(!cache.is_stale("missing").await);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let cache = TieredCache::new();
        cache.restore("k", expired_entry("v1", 1)).await;

        assert!(cache.get("k").await.is_none());
        assert!(cache.is_stale("k").await);
        assert_eq!(cache.get_stale("k").await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_ttl_expiry_after_wait() {
        let cache = TieredCache::new();
        cache.set("k", "v1".to_string(), 1).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get("k").await.is_none());
        assert!(cache.is_stale("k").await);
    }

    #[tokio::test]
    async fn test_degradation_after_wait() {
        let cache = TieredCache::new();
        cache.set_with_degradation("k", "v1".to_string(), 1, 100).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        let read = cache.get_with_fallback("k").await.unwrap();
        assert_eq!(read, FallbackRead { value: "v1".to_string(), is_stale: true });
    }

    #[tokio::test]
    async fn test_fallback_prefers_fresh_primary() {
        let cache = TieredCache::new();
        cache.set_with_degradation("k", "v1".to_string(), 60, 600).await;

        let read = cache.get_with_fallback("k").await.unwrap();
        assert!(!read.is_stale);
        assert_eq!(read.value, "v1");
    }

    #[tokio::test]
    async fn test_fallback_absent_when_both_expired() {
        let cache = TieredCache::new();
        cache.restore("k", expired_entry("v1", 1)).await;
        cache.restore(&backup_key("k"), expired_entry("v1", 24)).await;

        assert!(cache.get_with_fallback("k").await.is_none());
        assert_eq!(cache.get_stale("k").await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_get_stale_falls_through_to_backup() {
        let cache = TieredCache::new();
        cache.restore(&backup_key("k"), expired_entry("old", 10)).await;
        assert_eq!(cache.get_stale("k").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_backup_ttl_never_shorter_than_primary() {
        let cache = TieredCache::new();
        cache.set_with_degradation("k", "v".to_string(), 100, 10).await;
        let backup = cache.entry(&backup_key("k")).await.unwrap();
        assert_eq!(backup.ttl_seconds, 100);
    }

    #[tokio::test]
    async fn test_degradation_slots_share_write_time() {
        let cache = TieredCache::new();
        cache.set_with_degradation("k", 7u32, 10, 240).await;
        let primary = cache.entry("k").await.unwrap();
        let backup = cache.entry(&backup_key("k")).await.unwrap();
        assert_eq!(primary.stored_at, backup.stored_at);
        assert_eq!(backup.ttl_seconds, 240);
    }

    #[tokio::test]
    async fn test_capacity_reclaims_least_recently_set() {
        let cache = TieredCache::with_capacity_limit(2);
        cache.set("a", 1u8, 60).await;
        cache.set("b", 2u8, 60).await;
        cache.set("a", 3u8, 60).await;
        cache.set("c", 4u8, 60).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("b").await.is_none());
        assert_eq!(cache.get("a").await, Some(3));
        assert_eq!(cache.get("c").await, Some(4));
    }

    #[tokio::test]
    async fn test_purge_expired_and_stats() {
        let cache = TieredCache::new();
        cache.restore("old", expired_entry("x", 1)).await;
        cache.set_with_degradation("new", "y".to_string(), 60, 600).await;

        let stats = cache.stats().await;
        assert_eq!(stats, CacheStats { entries: 3, fresh: 2, stale: 1, backups: 1 });

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = TieredCache::new();
        let handle = cache.clone();
        handle.set("k", 1u8, 60).await;
        assert_eq!(cache.get("k").await, Some(1));
        assert!(cache.remove("k").await);
        assert!(handle.is_empty().await);
    }
}
