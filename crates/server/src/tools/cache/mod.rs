//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and purging the in-memory page cache.

pub mod stats;

pub use stats::{CacheStatsParams, cache_stats_impl};
