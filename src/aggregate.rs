//! Batch aggregation: per-item polarities into one comparable signal.
//!
//! Pure logic over an already-fetched batch; no I/O, suitable for unit tests
//! and offline replay against stored history.

use serde::{Deserialize, Serialize};

use crate::sentiment::PolarityScorer;

/// Classification threshold: |polarity| <= 0.05 counts as neutral.
pub const CLASSIFY_THRESHOLD: f64 = 0.05;

/// One unit of input text with its popularity weight and source tag.
/// Constructed per fetch, consumed once, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub text: String,
    /// Popularity score (e.g. upvotes). Non-positive values floor to 1 at
    /// aggregation time so every item contributes.
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub source: String,
}

impl RawItem {
    pub fn new(text: impl Into<String>, weight: i64) -> Self {
        Self {
            text: text.into(),
            weight,
            source: String::new(),
        }
    }
}

/// Summary statistics for one scored batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Plain average polarity, rounded to 3 decimals.
    pub mean_polarity: f64,
    /// Weight-adjusted average polarity, rounded to 3 decimals.
    pub weighted_mean_polarity: f64,
    /// Share of positive items in percent, rounded to 1 decimal.
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
    pub sample_size: usize,
    /// Individual scores in input order, for traceability.
    pub per_item_scores: Vec<f64>,
}

impl AggregateResult {
    /// The exact result for an empty batch: every numeric field 0.0.
    pub fn empty() -> Self {
        Self {
            mean_polarity: 0.0,
            weighted_mean_polarity: 0.0,
            positive_pct: 0.0,
            negative_pct: 0.0,
            neutral_pct: 0.0,
            sample_size: 0,
            per_item_scores: Vec::new(),
        }
    }
}

/// Score a batch and combine the per-item polarities.
///
/// Weights floor to 1 so a zero or negative popularity score cannot erase an
/// item or collapse the weighted divisor. The three fractions are computed
/// independently; rounding drift up to ±0.1 percentage point across the
/// triple is expected.
pub fn aggregate(scorer: &PolarityScorer, items: &[RawItem]) -> AggregateResult {
    if items.is_empty() {
        return AggregateResult::empty();
    }

    let mut scores = Vec::with_capacity(items.len());
    let mut weighted_sum = 0.0f64;
    let mut total_weight = 0i64;

    for item in items {
        let weight = item.weight.max(1);
        let polarity = scorer.score(&item.text);
        weighted_sum += polarity * weight as f64;
        total_weight += weight;
        scores.push(polarity);
    }

    let n = scores.len();
    let mean = scores.iter().sum::<f64>() / n as f64;
    let weighted_mean = if total_weight > 0 {
        weighted_sum / total_weight as f64
    } else {
        0.0
    };

    let positive = scores.iter().filter(|&&s| s > CLASSIFY_THRESHOLD).count();
    let negative = scores.iter().filter(|&&s| s < -CLASSIFY_THRESHOLD).count();
    let neutral = n - positive - negative;

    AggregateResult {
        mean_polarity: round3(mean),
        weighted_mean_polarity: round3(weighted_mean),
        positive_pct: round1(positive as f64 / n as f64 * 100.0),
        negative_pct: round1(negative as f64 / n as f64 * 100.0),
        neutral_pct: round1(neutral as f64 / n as f64 * 100.0),
        sample_size: n,
        per_item_scores: scores,
    }
}

#[inline]
fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[inline]
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
