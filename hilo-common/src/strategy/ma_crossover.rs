use super::base::{fallback, AnalysisContext, Signal, Strategy};
use rand::RngCore;

/// Follows a strictly ordered 5/10/20 moving-average stack.
pub struct MaCrossoverStrategy;

impl Strategy for MaCrossoverStrategy {
    fn id(&self) -> &str {
        "ma_crossover"
    }

    fn name(&self) -> &str {
        "Moving Average Crossover"
    }

    fn predict(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> Signal {
        match ctx.trend.alignment() {
            Some(category) => Signal::Conviction(category),
            None => fallback(self.id(), rng),
        }
    }
}
