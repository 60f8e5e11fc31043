//! Rolling-window quality tracking for retrieved content.
//!
//! The monitor observes what the fetch path served; it never blocks or
//! rejects a retrieval. Statistics are recomputed from the window on every
//! call instead of being kept as running totals.

pub mod classify;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use classify::{ContentClass, FallbackHeuristics, classify_content};

use crate::record::ContentRecord;

pub const DEFAULT_WINDOW: usize = 1_000;
pub const DEFAULT_SLA_TARGET: f64 = 0.95;

pub const MIN_SCORE: f64 = 0.5;
pub const MIN_CONFIDENCE: f64 = 0.4;
pub const MIN_CONTENT_LENGTH: usize = 200;
/// Checks that must pass out of the six in [`is_high_quality`].
pub const REQUIRED_CHECKS: usize = 4;

/// Quality observation for one retrieved record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QualitySample {
    pub record_id: String,
    /// Structural quality in [0, 1].
    pub score: f64,
    /// Belief that the content is real, in [0, 1].
    pub confidence: f64,
    pub content_length: usize,
    pub has_title: bool,
    pub has_sections: bool,
    pub is_fallback: bool,
    pub captured_at: DateTime<Utc>,
}

impl QualitySample {
    /// Derive a sample from a record, the text served for it, and its classification.
    pub fn assess(record: &ContentRecord, content: &str, class: ContentClass) -> Self {
        let content_length = content.trim().chars().count();
        let has_title = !record.title.trim().is_empty();
        let has_sections = content.lines().filter(|l| l.trim_start().starts_with('#')).count() >= 2
            || content.split("\n\n").filter(|p| !p.trim().is_empty()).count() >= 3;

        let length_part = (content_length as f64 / (MIN_CONTENT_LENGTH as f64 * 5.0)).min(1.0);
        let mut score = length_part * 0.6;
        if has_title {
            score += 0.2;
        }
        if has_sections {
            score += 0.2;
        }

        let confidence = match class {
            ContentClass::Real => 0.9,
            ContentClass::LikelyFallback => 0.5,
            ContentClass::Fallback => 0.1,
        };

        Self {
            record_id: record.id.clone(),
            score: score.clamp(0.0, 1.0),
            confidence,
            content_length,
            has_title,
            has_sections,
            is_fallback: class.is_fallback(),
            captured_at: Utc::now(),
        }
    }
}

/// Soft majority vote over six independent checks.
pub fn is_high_quality(sample: &QualitySample) -> bool {
    let checks = [
        sample.score >= MIN_SCORE,
        sample.confidence >= MIN_CONFIDENCE,
        sample.content_length >= MIN_CONTENT_LENGTH,
        !sample.is_fallback,
        sample.has_title,
        sample.has_sections,
    ];
    checks.iter().filter(|passed| **passed).count() >= REQUIRED_CHECKS
}

/// Aggregates over the current window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QualityStatistics {
    pub total: usize,
    /// Fraction of samples that were real (non-fallback) content.
    pub success_rate: f64,
    pub avg_score: f64,
    pub avg_confidence: f64,
    pub fallback_rate: f64,
    pub high_quality_rate: f64,
    pub sla_target: f64,
    pub meets_sla: bool,
}

/// Bounded ring buffer of quality samples.
#[derive(Debug, Clone)]
pub struct QualityMonitor {
    samples: VecDeque<QualitySample>,
    capacity: usize,
    sla_target: f64,
}

impl Default for QualityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_SLA_TARGET)
    }
}

impl QualityMonitor {
    pub fn new(capacity: usize, sla_target: f64) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity.min(DEFAULT_WINDOW)), capacity, sla_target }
    }

    /// Append `sample`, evicting the oldest once the window is full.
    pub fn record(&mut self, sample: QualitySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        if sample.is_fallback {
            tracing::warn!(record_id = %sample.record_id, "served fallback content");
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &QualitySample> {
        self.samples.iter()
    }

    /// Compute statistics from the window. An empty window meets the SLA.
    pub fn statistics(&self) -> QualityStatistics {
        let total = self.samples.len();
        if total == 0 {
            return QualityStatistics {
                total: 0,
                success_rate: 0.0,
                avg_score: 0.0,
                avg_confidence: 0.0,
                fallback_rate: 0.0,
                high_quality_rate: 0.0,
                sla_target: self.sla_target,
                meets_sla: true,
            };
        }

        let n = total as f64;
        let fallbacks = self.samples.iter().filter(|s| s.is_fallback).count() as f64;
        let high_quality = self.samples.iter().filter(|s| is_high_quality(s)).count() as f64;
        let score_sum: f64 = self.samples.iter().map(|s| s.score).sum();
        let confidence_sum: f64 = self.samples.iter().map(|s| s.confidence).sum();

        let success_rate = (n - fallbacks) / n;
        QualityStatistics {
            total,
            success_rate,
            avg_score: score_sum / n,
            avg_confidence: confidence_sum / n,
            fallback_rate: fallbacks / n,
            high_quality_rate: high_quality / n,
            sla_target: self.sla_target,
            meets_sla: success_rate >= self.sla_target,
        }
    }
}
