use crate::data::types::{Category, Sample};
use std::collections::VecDeque;

pub const DEFAULT_PATTERN_CAPACITY: usize = 30;
pub const DEFAULT_TREND_CAPACITY: usize = 20;

/// Bounded newest-first sample windows shared by all analyzers.
///
/// The front of each deque is the newest sample. Neither window ever holds
/// more than its configured capacity.
#[derive(Debug, Clone)]
pub struct RollingState {
    pattern_capacity: usize,
    trend_capacity: usize,
    pattern: VecDeque<Sample>,
    trend: VecDeque<Sample>,
}

impl Default for RollingState {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CAPACITY, DEFAULT_TREND_CAPACITY)
    }
}

impl RollingState {
    pub fn new(pattern_capacity: usize, trend_capacity: usize) -> Self {
        Self {
            pattern_capacity,
            trend_capacity,
            pattern: VecDeque::with_capacity(pattern_capacity),
            trend: VecDeque::with_capacity(trend_capacity),
        }
    }

    /// Replaces both windows with the head of `samples` (newest first).
    pub fn ingest(&mut self, samples: &[Sample]) {
        self.pattern.clear();
        self.pattern
            .extend(samples.iter().take(self.pattern_capacity).copied());
        self.trend.clear();
        self.trend.extend(samples.iter().take(self.trend_capacity).copied());
    }

    /// Pushes one newly observed sample onto the trend window, evicting the oldest.
    pub fn push_trend(&mut self, sample: Sample) {
        if self.trend_capacity == 0 {
            return;
        }
        self.trend.push_front(sample);
        while self.trend.len() > self.trend_capacity {
            self.trend.pop_back();
        }
    }

    pub fn clear_trend(&mut self) {
        self.trend.clear();
    }

    pub fn clear(&mut self) {
        self.pattern.clear();
        self.trend.clear();
    }

    pub fn pattern_window(&self) -> &VecDeque<Sample> {
        &self.pattern
    }

    pub fn trend_window(&self) -> &VecDeque<Sample> {
        &self.trend
    }

    pub fn trend_samples(&self) -> Vec<Sample> {
        self.trend.iter().copied().collect()
    }

    /// The pattern window reduced to its category sequence.
    pub fn categories(&self) -> Vec<Category> {
        self.pattern.iter().map(|s| s.category()).collect()
    }

    pub fn latest(&self) -> Option<Sample> {
        self.pattern.front().or_else(|| self.trend.front()).copied()
    }

    pub fn pattern_capacity(&self) -> usize {
        self.pattern_capacity
    }

    pub fn trend_capacity(&self) -> usize {
        self.trend_capacity
    }
}
