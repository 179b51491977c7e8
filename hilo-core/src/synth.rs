// Plausible sample value for a predicted category. Display and statistics only.

use crate::regime::Regime;
use hilo_common::analysis::trend::{TrendSnapshot, MOMENTUM_SPAN};
use hilo_common::{Category, Sample};
use rand::{Rng, RngCore};

/// Narrowed ranges drawn from while in the defensive regime.
pub fn conservative_range(category: Category) -> (u8, u8) {
    match category {
        Category::High => (6, 8),
        Category::Low => (1, 3),
    }
}

pub fn synthesize(
    category: Category,
    regime: Regime,
    trend_window: &[Sample],
    rng: &mut dyn RngCore,
) -> Sample {
    let (lo, hi) = category.range();

    let value = match regime {
        Regime::Defensive => {
            let (lo, hi) = conservative_range(category);
            rng.gen_range(lo..=hi)
        }
        Regime::Smart if trend_window.len() >= MOMENTUM_SPAN => {
            let center = TrendSnapshot::recent_mean(trend_window).unwrap_or(4.5);
            let jitter: i32 = rng.gen_range(-1..=1);
            let value = center.round() as i32 + jitter;
            value.clamp(lo as i32, hi as i32) as u8
        }
        Regime::Smart => rng.gen_range(lo..=hi),
    };

    Sample::saturating(value)
}
