// The prediction engine: ingest -> reconcile -> analyze -> predict, one poll at a time.

pub mod errors;

pub use errors::EngineError;

use crate::config::EngineSettings;
use crate::regime::{Combiner, Regime, Rule};
use crate::stats::{self, ConfidenceInputs, PredictionStats};
use crate::synth;
use hilo_common::analysis::{PatternAnalyzer, PatternMatch, RollingState, TrendAnalyzer, TrendSnapshot};
use hilo_common::strategy::AnalysisContext;
use hilo_common::{Category, Observation, PredictionRecord, Sample};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineMetrics {
    /// Consecutive incorrect resolutions.
    pub loss_streak: u32,
    pub total_predictions: u64,
    pub volatility_index: f64,
    /// Moving averages over 5/10/20 samples, once the trend window is full enough.
    pub moving_averages: Option<[f64; 3]>,
    pub analysis_resets: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub record_id: u64,
    pub predicted: Category,
    pub synthetic_sample: Sample,
    pub issued_period_id: Option<String>,
    pub regime: Regime,
    pub rule: Rule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Issued(PredictionOutcome),
    /// The newest period was already processed; nothing changed.
    Duplicate,
}

impl Submission {
    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match self {
            Submission::Issued(outcome) => Some(outcome),
            Submission::Duplicate => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Submission::Duplicate)
    }
}

/// Caller-owned engine state. Every mutation goes through `submit*`.
pub struct PredictionEngine {
    settings: EngineSettings,
    rolling: RollingState,
    patterns: PatternAnalyzer,
    trend: TrendSnapshot,
    combiner: Combiner,
    metrics: EngineMetrics,
    /// Newest first. Only the front record can be pending.
    history: VecDeque<PredictionRecord>,
    last_period_id: Option<String>,
    next_id: u64,
    rng: StdRng,
}

impl PredictionEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }

    pub fn with_seed(settings: EngineSettings, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: EngineSettings, rng: StdRng) -> Result<Self, EngineError> {
        settings
            .validate()
            .map_err(|e| EngineError::InvalidSettings(e.to_string()))?;
        Ok(Self {
            rolling: RollingState::new(settings.pattern_window, settings.trend_window),
            patterns: PatternAnalyzer::new(),
            trend: TrendSnapshot::default(),
            combiner: Combiner::new(),
            metrics: EngineMetrics::default(),
            history: VecDeque::with_capacity(settings.history_length + 1),
            last_period_id: None,
            next_id: 1,
            rng,
            settings,
        })
    }

    /// Convenience wrapper over `submit_observations` for source data.
    pub fn submit(&mut self, observations: &[Observation]) -> Result<Submission, EngineError> {
        let newest = observations.first().ok_or(EngineError::EmptyObservations)?;
        let samples: Vec<Sample> = observations.iter().map(|o| o.value).collect();
        self.submit_observations(&samples, &newest.period_id)
    }

    /// Runs one full cycle for a freshly fetched newest-first window.
    ///
    /// A repeated `newest_period_id` is a no-op returning `Submission::Duplicate`.
    pub fn submit_observations(
        &mut self,
        samples: &[Sample],
        newest_period_id: &str,
    ) -> Result<Submission, EngineError> {
        let newest = *samples.first().ok_or(EngineError::EmptyObservations)?;

        if self.last_period_id.as_deref() == Some(newest_period_id) {
            debug!(period = newest_period_id, "duplicate poll ignored");
            return Ok(Submission::Duplicate);
        }

        // Scores the previous prediction and may reset analysis; only the loss
        // streak and reset counter outlive the ingest below.
        self.resolve_pending(newest);

        self.rolling.ingest(samples);
        self.analyze();
        self.last_period_id = Some(newest_period_id.to_string());

        let regime = self.regime();
        if regime == Regime::Defensive {
            warn!(loss_streak = self.metrics.loss_streak, "defensive regime active");
        }

        let categories = self.rolling.categories();
        let ctx = AnalysisContext {
            categories: &categories,
            top_pattern: self.patterns.top(),
            trend: &self.trend,
        };
        let decision = self.combiner.combine(regime, &ctx, &mut self.rng);
        if decision.signal.is_fallback() {
            debug!(?regime, "prediction drawn at random, degraded confidence");
        }

        let synthetic = synth::synthesize(
            decision.category(),
            regime,
            &self.rolling.trend_samples(),
            &mut self.rng,
        );
        let issued_period_id = next_period_id(newest_period_id);
        let record_id = self.open_pending(decision.category(), issued_period_id.clone(), synthetic)?;
        self.metrics.total_predictions += 1;

        info!(
            id = record_id,
            predicted = %decision.category(),
            ?regime,
            rule = ?decision.rule,
            synthetic = synthetic.value(),
            period = issued_period_id.as_deref().unwrap_or("-"),
            "prediction issued"
        );

        Ok(Submission::Issued(PredictionOutcome {
            record_id,
            predicted: decision.category(),
            synthetic_sample: synthetic,
            issued_period_id,
            regime,
            rule: decision.rule,
        }))
    }

    /// Scores the pending prediction against `actual`.
    ///
    /// Returns `None` when nothing was pending, otherwise whether it was correct.
    fn resolve_pending(&mut self, actual: Sample) -> Option<bool> {
        let record = self.history.front_mut().filter(|r| !r.is_resolved())?;
        let correct = record.resolve(actual);
        let id = record.id;

        if correct {
            self.metrics.loss_streak = 0;
        } else {
            self.metrics.loss_streak += 1;
        }
        self.rolling.push_trend(actual);

        info!(
            id,
            actual = actual.value(),
            correct,
            loss_streak = self.metrics.loss_streak,
            "prediction resolved"
        );

        if self.metrics.loss_streak >= self.settings.defensive_loss_streak {
            self.reset_analysis();
        }
        Some(correct)
    }

    /// Drops the trend window and pattern table. The loss streak is kept.
    fn reset_analysis(&mut self) {
        self.rolling.clear_trend();
        self.patterns.clear();
        self.trend = TrendSnapshot::default();
        self.metrics.volatility_index = 0.0;
        self.metrics.moving_averages = None;
        self.metrics.analysis_resets += 1;
        warn!(
            loss_streak = self.metrics.loss_streak,
            resets = self.metrics.analysis_resets,
            "analysis reset"
        );
    }

    fn analyze(&mut self) {
        let categories = self.rolling.categories();
        self.patterns.analyze(&categories);
        self.trend = TrendAnalyzer::analyze(&self.rolling.trend_samples());
        self.metrics.volatility_index = self.trend.volatility;
        self.metrics.moving_averages = self.trend.moving_averages;
    }

    fn open_pending(
        &mut self,
        predicted: Category,
        period_id: Option<String>,
        synthetic: Sample,
    ) -> Result<u64, EngineError> {
        if let Some(pending) = self.pending() {
            return Err(EngineError::PendingUnresolved(pending.id));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.history
            .push_front(PredictionRecord::pending(id, predicted, period_id, synthetic));
        self.history.truncate(self.settings.history_length);
        Ok(id)
    }

    pub fn statistics(&self) -> PredictionStats {
        stats::calculate_stats(
            self.history.iter().rev(),
            self.metrics.total_predictions,
            self.metrics.loss_streak,
            self.regime(),
            &self.confidence_inputs(),
        )
    }

    pub fn confidence_inputs(&self) -> ConfidenceInputs {
        ConfidenceInputs {
            volatility: self.metrics.volatility_index,
            top_pattern_count: self.patterns.top().map(|p| p.occurrences),
            aligned: self.trend.is_aligned(),
        }
    }

    pub fn regime(&self) -> Regime {
        Regime::select(self.metrics.loss_streak, self.settings.defensive_loss_streak)
    }

    pub fn pending(&self) -> Option<&PredictionRecord> {
        self.history.front().filter(|r| !r.is_resolved())
    }

    /// Records newest first.
    pub fn history(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.history.iter()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn top_pattern(&self) -> Option<&PatternMatch> {
        self.patterns.top()
    }

    pub fn trend(&self) -> &TrendSnapshot {
        &self.trend
    }

    pub fn rolling(&self) -> &RollingState {
        &self.rolling
    }

    pub fn last_period_id(&self) -> Option<&str> {
        self.last_period_id.as_deref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

/// Decimal increment of a numeric period id of any length; `None` if not numeric.
pub fn next_period_id(period_id: &str) -> Option<String> {
    if period_id.is_empty() || !period_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits = period_id.as_bytes().to_vec();
    let mut i = digits.len();
    loop {
        if i == 0 {
            digits.insert(0, b'1');
            break;
        }
        i -= 1;
        if digits[i] == b'9' {
            digits[i] = b'0';
        } else {
            digits[i] += 1;
            break;
        }
    }
    String::from_utf8(digits).ok()
}
