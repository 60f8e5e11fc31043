//! In-memory tiered cache for fetched documentation content.
//!
//! This module provides a process-local cache with graceful degradation:
//!
//! - Per-entry TTL with explicit staleness queries
//! - A `<key>:backup` slot written alongside the primary with a longer TTL
//! - A stale read path that ignores TTL entirely
//! - Optional least-recently-set reclaim when a capacity bound is configured

pub mod entry;
pub mod key;
pub mod tiered;

pub use entry::CacheEntry;
pub use key::{PAGE_NAMESPACE, SECTIONS_NAMESPACE, backup_key, cache_key, url_cache_key};
pub use tiered::{CacheStats, FallbackRead, TieredCache};
