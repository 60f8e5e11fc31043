//! Synonym table and one-level query expansion.

use std::collections::BTreeMap;

use super::query::NormalizedQuery;

/// Built-in many-to-many synonym entries for design documentation vocabulary.
const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("44pt", &["touch targets", "touch target", "minimum size", "hit area"]),
    ("a11y", &["accessibility", "voiceover", "dynamic type"]),
    ("accessibility", &["voiceover", "dynamic type", "contrast", "a11y"]),
    ("alert", &["alerts", "dialog", "action sheet"]),
    ("button", &["buttons", "controls", "tap"]),
    ("color", &["colors", "palette", "contrast", "dark mode"]),
    ("colour", &["color", "colors", "palette"]),
    ("dark mode", &["appearance", "color"]),
    ("font", &["typography", "text styles", "dynamic type"]),
    ("hit area", &["touch target", "44pt"]),
    ("icon", &["icons", "sf symbols", "glyphs"]),
    ("layout", &["spacing", "margins", "safe area", "grid"]),
    ("menu", &["menus", "context menu", "pull-down"]),
    ("minimum size", &["touch target", "44pt"]),
    ("modal", &["sheets", "popovers", "alerts"]),
    ("nav", &["navigation", "navigation bars", "tab bars"]),
    ("navigation", &["navigation bars", "tab bars", "toolbars", "nav"]),
    ("touch target", &["44pt", "minimum size", "accessibility", "hit area"]),
    ("typography", &["font", "fonts", "text styles", "dynamic type"]),
];

/// Query terms after synonym expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Raw terms followed by any synonyms not already present.
    pub terms: Vec<String>,
    /// Every synonym produced by a matched table entry, whether or not it was also typed.
    pub synonyms: Vec<String>,
}

impl Expansion {
    pub fn is_synonym(&self, term: &str) -> bool {
        self.synonyms.iter().any(|s| s == term)
    }

    /// More than one term to match with.
    pub fn is_expanded(&self) -> bool {
        self.terms.len() > 1
    }
}

/// Mapping from a term or phrase to related terms.
///
/// Keys and values are stored lowercase. Keys containing a space match as a
/// phrase inside the normalized query; single-word keys match a query term.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in design-vocabulary table.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (key, values) in BUILTIN_SYNONYMS {
            table.insert(key, values.iter().map(|v| v.to_string()));
        }
        table
    }

    /// Add synonyms for `key`, merging with any existing entry.
    pub fn insert(&mut self, key: &str, values: impl IntoIterator<Item = String>) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        let slot = self.entries.entry(key.clone()).or_default();
        for value in values {
            let value = value.trim().to_lowercase();
            if !value.is_empty() && value != key && !slot.contains(&value) {
                slot.push(value);
            }
        }
    }

    /// Merge every entry of `other` into this table.
    pub fn extend<I, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        for (key, values) in other {
            self.insert(&key, values);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand `query` one level deep. Synonyms of synonyms are not followed.
    pub fn expand(&self, query: &NormalizedQuery) -> Expansion {
        let mut expansion = Expansion { terms: query.terms.clone(), synonyms: Vec::new() };

        for (key, values) in &self.entries {
            let matched = if key.contains(' ') {
                contains_phrase(&query.text, key)
            } else {
                query.terms.iter().any(|t| t == key)
            };
            if !matched {
                continue;
            }
            for value in values {
                if !expansion.synonyms.contains(value) {
                    expansion.synonyms.push(value.clone());
                }
                if !expansion.terms.contains(value) {
                    expansion.terms.push(value.clone());
                }
            }
        }

        expansion
    }
}

/// Whole-word phrase containment on space-separated text.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded = format!(" {text} ");
    padded.contains(&format!(" {phrase} "))
}
