use crate::data::types::{Category, Sample};
use serde::{Deserialize, Serialize};

/// Moving-average windows: short, mid, long.
pub const MA_WINDOWS: [usize; 3] = [5, 10, 20];
/// Number of most recent samples used for momentum, dispersion and weighting.
pub const MOMENTUM_SPAN: usize = 5;
pub const SHORT_MOMENTUM_SPAN: usize = 3;

/// Trend and volatility readings over the newest-first trend window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub samples: usize,
    pub latest: Option<Sample>,
    /// Newest minus oldest of the most recent five samples.
    pub momentum: Option<f64>,
    /// Newest minus oldest of the most recent three samples.
    pub short_momentum: Option<f64>,
    /// Population standard deviation of the most recent five samples.
    pub dispersion: Option<f64>,
    /// Mean absolute difference between consecutive samples.
    pub volatility: f64,
    pub moving_averages: Option<[f64; 3]>,
    /// Index-weighted mean of the most recent five samples, newest weighted highest.
    pub weighted_average: Option<f64>,
}

impl TrendSnapshot {
    pub fn has_momentum(&self) -> bool {
        self.momentum.is_some()
    }

    pub fn latest_category(&self) -> Option<Category> {
        self.latest.map(Sample::category)
    }

    /// `High` for ma5 > ma10 > ma20, `Low` for ma5 < ma10 < ma20.
    pub fn alignment(&self) -> Option<Category> {
        let [short, mid, long] = self.moving_averages?;
        if short > mid && mid > long {
            Some(Category::High)
        } else if short < mid && mid < long {
            Some(Category::Low)
        } else {
            None
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.alignment().is_some()
    }

    /// Mean of the most recent five samples (fewer if the window is shorter).
    pub fn recent_mean(window: &[Sample]) -> Option<f64> {
        let recent = &window[..window.len().min(MOMENTUM_SPAN)];
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().map(|s| s.as_f64()).sum::<f64>() / recent.len() as f64)
    }
}

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn analyze(window: &[Sample]) -> TrendSnapshot {
        TrendSnapshot {
            samples: window.len(),
            latest: window.first().copied(),
            momentum: Self::momentum(window, MOMENTUM_SPAN),
            short_momentum: Self::momentum(window, SHORT_MOMENTUM_SPAN),
            dispersion: Self::dispersion(window),
            volatility: Self::volatility(window),
            moving_averages: Self::moving_averages(window),
            weighted_average: Self::weighted_average(window),
        }
    }

    fn momentum(window: &[Sample], span: usize) -> Option<f64> {
        if window.len() < MOMENTUM_SPAN {
            return None;
        }
        Some(window[0].as_f64() - window[span - 1].as_f64())
    }

    fn dispersion(window: &[Sample]) -> Option<f64> {
        if window.len() < MOMENTUM_SPAN {
            return None;
        }
        let recent = &window[..MOMENTUM_SPAN];
        let n = recent.len() as f64;
        let mean = recent.iter().map(|s| s.as_f64()).sum::<f64>() / n;
        let variance = recent
            .iter()
            .map(|s| (s.as_f64() - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(variance.sqrt())
    }

    pub fn volatility(window: &[Sample]) -> f64 {
        if window.len() < 2 {
            return 0.0;
        }
        let total: f64 = window
            .windows(2)
            .map(|w| (w[0].as_f64() - w[1].as_f64()).abs())
            .sum();
        total / (window.len() - 1) as f64
    }

    fn moving_averages(window: &[Sample]) -> Option<[f64; 3]> {
        let mut averages = [0.0; 3];
        for (slot, &period) in averages.iter_mut().zip(MA_WINDOWS.iter()) {
            *slot = Self::sma(window, period)?;
        }
        Some(averages)
    }

    fn sma(window: &[Sample], period: usize) -> Option<f64> {
        if window.len() < period {
            return None;
        }
        let sum: f64 = window.iter().take(period).map(|s| s.as_f64()).sum();
        Some(sum / period as f64)
    }

    fn weighted_average(window: &[Sample]) -> Option<f64> {
        let recent = &window[..window.len().min(MOMENTUM_SPAN)];
        if recent.is_empty() {
            return None;
        }
        let n = recent.len();
        let (num, den) = recent
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, s)| {
                let weight = (n - i) as f64;
                (num + weight * s.as_f64(), den + weight)
            });
        Some(num / den)
    }
}
