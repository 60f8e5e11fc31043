//! Content records and search result types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A retrieved documentation page, ready for indexing.
///
/// Records are never mutated; a re-fetch produces a new record that
/// supersedes the old one by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ContentRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(alias = "platformTag")]
    pub platform: String,
    #[serde(alias = "categoryTag")]
    pub category: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One scored hit for a query. Computed per query, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RankedResult {
    pub record_id: String,
    pub title: String,
    pub url: String,
    pub platform: String,
    pub category: String,
    pub snippet: String,
    pub relevance_score: f64,
    pub matched_fields: BTreeSet<String>,
}

/// Ranked hits plus the number of matches before truncation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchResults {
    pub results: Vec<RankedResult>,
    pub total: usize,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_tag_aliases() {
        let json = r#"{
            "id": "buttons",
            "title": "Buttons",
            "url": "https://example.com/buttons",
            "platformTag": "ios",
            "categoryTag": "components",
            "keywords": ["tap", "controls"]
        }"#;
        let record: ContentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.platform, "ios");
        assert_eq!(record.category, "components");
        assert!(record.keywords.contains("tap"));
        assert!(record.snippet.is_empty());
        assert!(record.body.is_none());
    }

    #[test]
    fn test_empty_results_serialize() {
        let json = serde_json::to_value(SearchResults::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "results": [], "total": 0 }));
    }
}
