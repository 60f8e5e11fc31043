//! Weighted relevance scoring of one record against an expanded query.

use std::collections::BTreeSet;

use super::query::NormalizedQuery;
use super::synonyms::Expansion;
use crate::record::ContentRecord;

pub const EXACT_TITLE_WEIGHT: f64 = 5.0;
pub const PARTIAL_TITLE_WEIGHT: f64 = 3.0;
pub const TITLE_TERM_WEIGHT: f64 = 1.5;
pub const KEYWORD_TERM_WEIGHT: f64 = 1.0;
pub const SNIPPET_PHRASE_WEIGHT: f64 = 0.5;
pub const SNIPPET_TERM_WEIGHT: f64 = 0.3;
pub const SYNONYM_BONUS: f64 = 0.8;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_KEYWORDS: &str = "keywords";
pub const FIELD_SNIPPET: &str = "snippet";
pub const FIELD_SYNONYM: &str = "synonym";

/// Score and the fields that contributed to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub value: f64,
    pub matched_fields: BTreeSet<String>,
}

fn collapse(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect()
}

fn title_has_term(title: &str, title_words: &[&str], term: &str) -> bool {
    if term.contains(' ') { title.contains(term) } else { title_words.iter().any(|w| w.starts_with(term)) }
}

fn keyword_has_term(keywords: &[String], term: &str) -> bool {
    keywords.iter().any(|k| {
        if term.contains(' ') { k.contains(term) } else { k.split_whitespace().any(|w| w.starts_with(term)) }
    })
}

/// Score `record` against `query` and its expansion.
///
/// Phrase weights (exact/partial title, snippet phrase) take the best of every
/// contiguous run of query terms, so appending a term never removes a phrase
/// match. A run equal to the title earns the exact weight only when every query
/// term is a title word; otherwise it counts as partial. Per-term weights count
/// unique expanded terms.
pub fn score_record(record: &ContentRecord, query: &NormalizedQuery, expansion: &Expansion) -> Score {
    let title = collapse(&record.title);
    let title_words = words(&title);
    let snippet = collapse(&record.snippet);
    let keywords: Vec<String> = record.keywords.iter().map(|k| collapse(k)).collect();

    let mut score = Score::default();
    let mut synonym_hit = false;

    let query_within_title = query.terms.iter().all(|t| title.split_whitespace().any(|w| w == t));
    let phrases = query.phrases();
    let title_phrase = phrases
        .iter()
        .map(|p| {
            if title == *p && query_within_title {
                EXACT_TITLE_WEIGHT
            } else if title.contains(p.as_str()) {
                PARTIAL_TITLE_WEIGHT
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max);
    if title_phrase > 0.0 {
        score.value += title_phrase;
        score.matched_fields.insert(FIELD_TITLE.into());
    }

    if phrases.iter().any(|p| snippet.contains(p.as_str())) {
        score.value += SNIPPET_PHRASE_WEIGHT;
        score.matched_fields.insert(FIELD_SNIPPET.into());
    }

    for term in &expansion.terms {
        let mut hit = false;
        if title_has_term(&title, &title_words, term) {
            score.value += TITLE_TERM_WEIGHT;
            score.matched_fields.insert(FIELD_TITLE.into());
            hit = true;
        }
        if keyword_has_term(&keywords, term) {
            score.value += KEYWORD_TERM_WEIGHT;
            score.matched_fields.insert(FIELD_KEYWORDS.into());
            hit = true;
        }
        if snippet.contains(term.as_str()) {
            score.value += SNIPPET_TERM_WEIGHT;
            score.matched_fields.insert(FIELD_SNIPPET.into());
            hit = true;
        }
        if hit && expansion.is_synonym(term) {
            synonym_hit = true;
        }
    }

    if synonym_hit && expansion.is_expanded() {
        score.value += SYNONYM_BONUS;
        score.matched_fields.insert(FIELD_SYNONYM.into());
    }

    score
}
