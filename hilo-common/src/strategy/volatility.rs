use super::base::{fallback, AnalysisContext, Signal, Strategy};
use rand::RngCore;

pub const COUNTER_TREND_VOLATILITY: f64 = 2.5;

/// Counter-trend in choppy windows, trend-following in calm ones.
pub struct VolatilityStrategy;

impl Strategy for VolatilityStrategy {
    fn id(&self) -> &str {
        "volatility"
    }

    fn name(&self) -> &str {
        "Volatility"
    }

    fn predict(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> Signal {
        let Some(latest) = ctx.trend.latest_category() else {
            return fallback(self.id(), rng);
        };
        if ctx.trend.volatility > COUNTER_TREND_VOLATILITY {
            Signal::Conviction(latest.opposite())
        } else {
            Signal::Conviction(latest)
        }
    }
}
