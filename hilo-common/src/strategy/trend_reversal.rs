use super::base::{fallback, AnalysisContext, Signal, Strategy};
use crate::data::types::Category;
use rand::RngCore;

pub const REVERSAL_MOMENTUM: f64 = 2.0;

/// Expects a strong five-sample move to snap back.
pub struct TrendReversalStrategy;

impl Strategy for TrendReversalStrategy {
    fn id(&self) -> &str {
        "trend_reversal"
    }

    fn name(&self) -> &str {
        "Trend Reversal"
    }

    fn predict(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> Signal {
        match ctx.trend.momentum {
            Some(m) if m > REVERSAL_MOMENTUM => Signal::Conviction(Category::Low),
            Some(m) if m < -REVERSAL_MOMENTUM => Signal::Conviction(Category::High),
            _ => fallback(self.id(), rng),
        }
    }
}
