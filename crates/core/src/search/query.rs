//! Query normalization and validation.

use crate::Error;

/// A lowercased, trimmed query split into terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Terms joined by single spaces.
    pub text: String,
    /// Unique whitespace-separated terms longer than one character, in query order.
    pub terms: Vec<String>,
}

impl NormalizedQuery {
    /// Contiguous runs of terms, joined by spaces. The longest run is the whole query.
    pub fn phrases(&self) -> Vec<String> {
        let mut phrases = Vec::new();
        for start in 0..self.terms.len() {
            for end in start + 1..=self.terms.len() {
                phrases.push(self.terms[start..end].join(" "));
            }
        }
        phrases
    }
}

/// Normalize `raw` for scoring.
///
/// Returns `Ok(None)` when nothing searchable remains (empty, whitespace, or
/// only single-character terms). A trimmed query longer than `max_chars`
/// characters is rejected rather than truncated.
pub fn normalize(raw: &str, max_chars: usize) -> Result<Option<NormalizedQuery>, Error> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(Error::InvalidQuery(format!("query too long: {length} chars (max {max_chars})")));
    }

    let lowered = trimmed.to_lowercase();
    let mut terms: Vec<String> = Vec::new();
    for term in lowered.split_whitespace() {
        if term.chars().count() > 1 && !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }

    if terms.is_empty() {
        return Ok(None);
    }

    Ok(Some(NormalizedQuery { text: terms.join(" "), terms }))
}
