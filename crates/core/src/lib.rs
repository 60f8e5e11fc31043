//! Core types and shared functionality for docshelf.
//!
//! This crate provides:
//! - Tiered in-memory cache with backup slots for graceful degradation
//! - Relevance search engine with synonym expansion
//! - Quality monitoring of served content
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod quality;
pub mod record;
pub mod search;

pub use cache::{CacheEntry, FallbackRead, TieredCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use quality::{ContentClass, FallbackHeuristics, QualityMonitor, QualitySample, QualityStatistics};
pub use record::{ContentRecord, RankedResult, SearchResults};
pub use search::{RelevanceSearchEngine, SearchFilters, SynonymTable};
