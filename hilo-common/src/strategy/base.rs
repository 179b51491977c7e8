use crate::analysis::{PatternMatch, TrendSnapshot};
use crate::data::types::Category;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// The strategy's own reading of the data.
    Conviction(Category),
    /// Not enough data; a uniform-random default was drawn.
    Fallback(Category),
}

impl Signal {
    pub fn category(self) -> Category {
        match self {
            Signal::Conviction(c) | Signal::Fallback(c) => c,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Signal::Fallback(_))
    }
}

/// Read-only view of the current cycle's analysis.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// Pattern window categories, newest first.
    pub categories: &'a [Category],
    pub top_pattern: Option<&'a PatternMatch>,
    pub trend: &'a TrendSnapshot,
}

impl<'a> AnalysisContext<'a> {
    /// Continuation implied by the top pattern, if its head aligns with the window.
    pub fn pattern_continuation(&self) -> Option<Category> {
        self.top_pattern?.continuation(self.categories)
    }
}

pub trait Strategy: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn predict(&self, ctx: &AnalysisContext<'_>, rng: &mut dyn RngCore) -> Signal;
}

/// Uniform-random default used when a strategy has no reading.
pub fn fallback(strategy: &str, rng: &mut dyn RngCore) -> Signal {
    let category = random_category(rng);
    tracing::debug!(strategy, %category, "insufficient data, degraded-confidence default");
    Signal::Fallback(category)
}

pub fn random_category(rng: &mut dyn RngCore) -> Category {
    if rng.gen_bool(0.5) {
        Category::High
    } else {
        Category::Low
    }
}
