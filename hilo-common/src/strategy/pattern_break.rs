use super::base::{fallback, AnalysisContext, Signal, Strategy};
use rand::RngCore;

/// Contrarian: bets against the continuation implied by the top pattern.
pub struct PatternBreakStrategy;

impl Strategy for PatternBreakStrategy {
    fn id(&self) -> &str {
        "pattern_break"
    }

    fn name(&self) -> &str {
        "Pattern Break"
    }

    fn predict(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> Signal {
        match ctx.pattern_continuation() {
            Some(continuation) => Signal::Conviction(continuation.opposite()),
            None => fallback(self.id(), rng),
        }
    }
}
