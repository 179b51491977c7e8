// Aggregate statistics and the confidence/stability score.

use crate::regime::Regime;
use hilo_common::{Category, PredictionRecord};
use serde::{Deserialize, Serialize};

const VOLATILITY_WEIGHT: f64 = 0.4;
const PATTERN_WEIGHT: f64 = 0.3;
const ALIGNMENT_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionStats {
    pub total: u64,
    pub resolved: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Pending predictions by category.
    pub high_count: usize,
    pub low_count: usize,
    /// Longest run of identical consecutive actual categories.
    pub streak: usize,
    pub high_wins: usize,
    pub low_wins: usize,
    pub total_wins: usize,
    /// Synthetic sample value of the current pending prediction.
    pub distribution: Option<u8>,
    pub confidence: u8,
    pub regime: Regime,
    pub loss_streak: u32,
}

/// Inputs to the confidence score, taken from the latest analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub volatility: f64,
    pub top_pattern_count: Option<usize>,
    pub aligned: bool,
}

/// Weighted blend of volatility, pattern stability and moving-average
/// alignment, rounded and clamped to 0..=100.
pub fn confidence_score(inputs: &ConfidenceInputs) -> u8 {
    let volatility = (100.0 - inputs.volatility * 20.0).max(0.0);
    let pattern = match inputs.top_pattern_count {
        Some(count) if count > 0 => (1.0 / count as f64) * 50.0,
        _ => 100.0,
    };
    let alignment = if inputs.aligned { 100.0 } else { 50.0 };

    let score =
        volatility * VOLATILITY_WEIGHT + pattern * PATTERN_WEIGHT + alignment * ALIGNMENT_WEIGHT;
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// Derives statistics from records in emission order (oldest first).
pub fn calculate_stats<'a, I>(
    history: I,
    total_predictions: u64,
    loss_streak: u32,
    regime: Regime,
    confidence: &ConfidenceInputs,
) -> PredictionStats
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let mut stats = PredictionStats {
        total: total_predictions,
        resolved: 0,
        correct: 0,
        accuracy: 0.0,
        high_count: 0,
        low_count: 0,
        streak: 0,
        high_wins: 0,
        low_wins: 0,
        total_wins: 0,
        distribution: None,
        confidence: confidence_score(confidence),
        regime,
        loss_streak,
    };

    let mut run: Option<(Category, usize)> = None;
    for record in history {
        let Some(outcome) = record.outcome else {
            match record.predicted {
                Category::High => stats.high_count += 1,
                Category::Low => stats.low_count += 1,
            }
            stats.distribution = Some(record.synthetic_sample.value());
            continue;
        };

        stats.resolved += 1;
        if outcome.category == record.predicted {
            stats.correct += 1;
            match outcome.category {
                Category::High => stats.high_wins += 1,
                Category::Low => stats.low_wins += 1,
            }
        }

        let length = match run {
            Some((category, length)) if category == outcome.category => length + 1,
            _ => 1,
        };
        run = Some((outcome.category, length));
        stats.streak = stats.streak.max(length);
    }

    stats.total_wins = stats.high_wins + stats.low_wins;
    if stats.resolved > 0 {
        stats.accuracy = stats.correct as f64 / stats.resolved as f64 * 100.0;
    }
    stats
}
