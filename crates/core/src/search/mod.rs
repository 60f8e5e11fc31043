//! Relevance-ranked keyword search over indexed content records.
//!
//! ### Algorithm
//! - Normalize the query (lowercase, trim, terms longer than one character).
//! - Expand terms one level through a [`SynonymTable`].
//! - Score every record that passes the platform/category filters with
//!   weighted title, keyword and snippet matches plus a synonym bonus.
//! - Drop zero scores, stable-sort by score (ties keep index order), truncate.
//!
//! The index is independent of the cache: a record stays searchable until it
//! is superseded by id or evicted, even when its cache entry has expired.

pub mod query;
pub mod scoring;
pub mod synonyms;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub use query::{NormalizedQuery, normalize};
pub use scoring::{Score, score_record};
pub use synonyms::{Expansion, SynonymTable};

use crate::Error;
use crate::record::{ContentRecord, RankedResult, SearchResults};

/// Default cap on query length, in characters.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 100;

/// Optional platform/category restriction. Matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub platform: Option<String>,
    pub category: Option<String>,
}

impl SearchFilters {
    pub fn accepts(&self, record: &ContentRecord) -> bool {
        let matches = |filter: &Option<String>, tag: &str| {
            filter
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .is_none_or(|f| f.eq_ignore_ascii_case(tag))
        };
        matches(&self.platform, &record.platform) && matches(&self.category, &record.category)
    }
}

/// In-memory index of content records with synonym-aware scoring.
#[derive(Debug, Clone)]
pub struct RelevanceSearchEngine {
    records: Vec<ContentRecord>,
    positions: HashMap<String, usize>,
    synonyms: SynonymTable,
    max_query_length: usize,
}

impl Default for RelevanceSearchEngine {
    fn default() -> Self {
        Self::new(SynonymTable::builtin())
    }
}

impl RelevanceSearchEngine {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { records: Vec::new(), positions: HashMap::new(), synonyms, max_query_length: DEFAULT_MAX_QUERY_LENGTH }
    }

    pub fn with_max_query_length(mut self, max_query_length: usize) -> Self {
        self.max_query_length = max_query_length;
        self
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Add `record`, or replace the record with the same id in place.
    ///
    /// A superseding record keeps its predecessor's position so tie-breaks
    /// stay deterministic across re-fetches.
    pub fn upsert(&mut self, record: ContentRecord) {
        match self.positions.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Remove the record with `id`. Returns it if present.
    pub fn evict(&mut self, id: &str) -> Option<ContentRecord> {
        let pos = self.positions.remove(id)?;
        let removed = self.records.remove(pos);
        for p in self.positions.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load a pre-built index: a JSON object mapping id to record.
    ///
    /// Records are inserted in id order. A record without an id takes its map key.
    pub fn load_seed_str(&mut self, json: &str) -> Result<usize, Error> {
        let seed: BTreeMap<String, ContentRecord> =
            serde_json::from_str(json).map_err(|e| Error::SeedLoad(format!("invalid seed index: {e}")))?;
        let count = seed.len();
        for (id, mut record) in seed {
            if record.id.is_empty() {
                record.id = id;
            }
            self.upsert(record);
        }
        Ok(count)
    }

    /// Load a pre-built index from a JSON file.
    pub fn load_seed(&mut self, path: impl AsRef<Path>) -> Result<usize, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::SeedLoad(format!("failed to read {}: {e}", path.display())))?;
        let count = self.load_seed_str(&json)?;
        tracing::info!(path = %path.display(), records = count, "loaded seed index");
        Ok(count)
    }

    /// Rank indexed records against `query`.
    ///
    /// Empty or whitespace queries yield empty results. Over-length queries
    /// fail with [`Error::InvalidQuery`].
    pub fn search(&self, query: &str, filters: &SearchFilters, limit: usize) -> Result<SearchResults, Error> {
        let Some(normalized) = normalize(query, self.max_query_length)? else {
            return Ok(SearchResults::empty());
        };
        let expansion = self.synonyms.expand(&normalized);

        let mut scored: Vec<(&ContentRecord, Score)> = self
            .records
            .iter()
            .filter(|record| filters.accepts(record))
            .map(|record| (record, score_record(record, &normalized, &expansion)))
            .filter(|(_, score)| score.value > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.value.partial_cmp(&a.1.value).unwrap_or(Ordering::Equal));

        let total = scored.len();
        let results = scored
            .into_iter()
            .take(limit)
            .map(|(record, score)| RankedResult {
                record_id: record.id.clone(),
                title: record.title.clone(),
                url: record.url.clone(),
                platform: record.platform.clone(),
                category: record.category.clone(),
                snippet: record.snippet.clone(),
                relevance_score: score.value,
                matched_fields: score.matched_fields,
            })
            .collect();

        tracing::debug!(query = %normalized.text, expanded = expansion.terms.len(), total, "search completed");

        Ok(SearchResults { results, total })
    }
}
