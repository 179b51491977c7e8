// Regime selection and the two combination policies over the strategy ensemble.

use hilo_common::strategy::{self, fallback, AnalysisContext, Signal, Strategy};
use hilo_common::Category;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PATTERN_FOLLOW_PROBABILITY: f64 = 0.8;
pub const DISPERSION_LIMIT: f64 = 3.0;
pub const ACCELERATION_MOMENTUM: f64 = 2.0;
pub const CONSENSUS_SHARE: f64 = 0.75;
pub const TIEBREAK_VOLATILITY: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Regime {
    Smart,
    Defensive,
}

impl Regime {
    /// Re-evaluated every cycle; never sticky.
    pub fn select(loss_streak: u32, defensive_threshold: u32) -> Self {
        if loss_streak >= defensive_threshold {
            Regime::Defensive
        } else {
            Regime::Smart
        }
    }
}

/// Which rule of the active combiner produced the prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rule {
    PatternContinuation,
    Dispersion,
    Acceleration,
    Deceleration,
    MovingAverage,
    WeightedAverage,
    Consensus,
    VolatileFollow,
    CalmAlternate,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub regime: Regime,
    pub rule: Rule,
    pub signal: Signal,
}

impl Decision {
    pub fn category(&self) -> Category {
        self.signal.category()
    }
}

pub struct Combiner {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Combiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Combiner {
    pub fn new() -> Self {
        Self {
            strategies: strategy::ensemble(),
        }
    }

    pub fn combine(
        &self,
        regime: Regime,
        ctx: &AnalysisContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Decision {
        let (rule, signal) = match regime {
            Regime::Smart => Self::smart(ctx, rng),
            Regime::Defensive => self.defensive(ctx, rng),
        };
        Decision {
            regime,
            rule,
            signal,
        }
    }

    fn smart(ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> (Rule, Signal) {
        if let Some(continuation) = ctx.pattern_continuation() {
            if rng.gen_bool(PATTERN_FOLLOW_PROBABILITY) {
                return (Rule::PatternContinuation, Signal::Conviction(continuation));
            }
        }

        let trend = ctx.trend;
        if let (Some(momentum), Some(dispersion)) = (trend.momentum, trend.dispersion) {
            if dispersion > DISPERSION_LIMIT {
                return (Rule::Dispersion, Signal::Conviction(against(momentum)));
            }
            if momentum.abs() > ACCELERATION_MOMENTUM {
                let recent = trend.short_momentum.unwrap_or(0.0);
                return if recent.abs() > momentum.abs() {
                    (Rule::Acceleration, Signal::Conviction(along(momentum)))
                } else {
                    (Rule::Deceleration, Signal::Conviction(against(momentum)))
                };
            }
        }

        if let Some(category) = trend.alignment() {
            return (Rule::MovingAverage, Signal::Conviction(category));
        }

        match trend.weighted_average {
            Some(avg) if avg >= 5.0 => (Rule::WeightedAverage, Signal::Conviction(Category::High)),
            Some(_) => (Rule::WeightedAverage, Signal::Conviction(Category::Low)),
            None => (Rule::Random, fallback("smart", rng)),
        }
    }

    fn defensive(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> (Rule, Signal) {
        let votes: Vec<Signal> = self
            .strategies
            .iter()
            .map(|s| {
                let vote = s.predict(ctx, rng);
                debug!(strategy = s.id(), ?vote, "defensive vote");
                vote
            })
            .collect();

        let highs = votes
            .iter()
            .filter(|v| v.category() == Category::High)
            .count();
        let lows = votes.len() - highs;
        let (winner, count) = if highs >= lows {
            (Category::High, highs)
        } else {
            (Category::Low, lows)
        };

        if !votes.is_empty() && count as f64 / votes.len() as f64 >= CONSENSUS_SHARE {
            return (Rule::Consensus, Signal::Conviction(winner));
        }

        match ctx.trend.latest_category() {
            Some(last) if ctx.trend.volatility > TIEBREAK_VOLATILITY => {
                (Rule::VolatileFollow, Signal::Conviction(last))
            }
            Some(last) => (Rule::CalmAlternate, Signal::Conviction(last.opposite())),
            None => (Rule::Random, fallback("defensive", rng)),
        }
    }
}

fn along(momentum: f64) -> Category {
    if momentum > 0.0 {
        Category::High
    } else {
        Category::Low
    }
}

/// Opposite of the momentum sign; zero counts as non-positive.
fn against(momentum: f64) -> Category {
    if momentum > 0.0 {
        Category::Low
    } else {
        Category::High
    }
}
