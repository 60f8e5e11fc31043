//! Placeholder/fallback content detection.
//!
//! The origin sometimes answers 200 with a shell page ("enable JavaScript",
//! "page not found", skeleton loaders). [`classify_content`] is a heuristic:
//! its thresholds live in [`FallbackHeuristics`] so they can be tuned from
//! configuration rather than treated as fixed truths.

use serde::{Deserialize, Serialize};

/// Built-in phrases that mark placeholder pages.
pub const DEFAULT_FALLBACK_INDICATORS: &[&str] = &[
    "page not found",
    "this page requires javascript",
    "please enable javascript",
    "javascript is required",
    "content unavailable",
    "temporarily unavailable",
    "coming soon",
    "placeholder",
    "loading...",
];

/// Default minimum length of real content, in characters.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 200;

/// How much a fetched page looks like real documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    Real,
    LikelyFallback,
    Fallback,
}

impl ContentClass {
    pub fn is_fallback(self) -> bool {
        matches!(self, ContentClass::Fallback)
    }
}

/// Tunable thresholds for [`classify_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackHeuristics {
    pub min_content_length: usize,
    /// Lowercase phrases; a hit counts once per phrase.
    pub indicators: Vec<String>,
}

impl Default for FallbackHeuristics {
    fn default() -> Self {
        Self {
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            indicators: DEFAULT_FALLBACK_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FallbackHeuristics {
    /// Build from configured values; an empty indicator list keeps the defaults.
    pub fn new(min_content_length: usize, indicators: &[String]) -> Self {
        let mut heuristics = Self { min_content_length, ..Self::default() };
        if !indicators.is_empty() {
            heuristics.indicators = indicators.iter().map(|s| s.trim().to_lowercase()).collect();
        }
        heuristics
    }

    fn indicator_hits(&self, lowered: &str) -> usize {
        self.indicators
            .iter()
            .filter(|phrase| !phrase.is_empty() && lowered.contains(phrase.as_str()))
            .count()
    }
}

/// Classify `text` as real, likely-placeholder, or placeholder content.
///
/// - Two or more indicator phrases, or one phrase in short content: `Fallback`.
/// - One indicator phrase, or content under the minimum length: `LikelyFallback`.
/// - Otherwise: `Real`.
pub fn classify_content(text: &str, heuristics: &FallbackHeuristics) -> ContentClass {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ContentClass::Fallback;
    }

    let lowered = trimmed.to_lowercase();
    let hits = heuristics.indicator_hits(&lowered);
    let short = trimmed.chars().count() < heuristics.min_content_length;

    match (hits, short) {
        (h, _) if h >= 2 => ContentClass::Fallback,
        (1, true) => ContentClass::Fallback,
        (1, false) | (0, true) => ContentClass::LikelyFallback,
        _ => ContentClass::Real,
    }
}
