use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error types for sample validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Sample out of range: {0} (expected 0-9)")]
    SampleOutOfRange(i64),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

/// High/Low classification of a sample. High iff the sample is 5 or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    High,
    Low,
}

impl Category {
    pub fn classify(sample: Sample) -> Self {
        if sample.value() >= 5 {
            Category::High
        } else {
            Category::Low
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Category::High => Category::Low,
            Category::Low => Category::High,
        }
    }

    /// Inclusive legal sample range for this category.
    pub fn range(self) -> (u8, u8) {
        match self {
            Category::High => (5, 9),
            Category::Low => (0, 4),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Category::High => "High",
            Category::Low => "Low",
        })
    }
}

/// One observed digit in [0, 9].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sample(u8);

impl Sample {
    pub const MAX: u8 = 9;

    pub fn new(value: u8) -> Result<Self, DataError> {
        if value > Self::MAX {
            return Err(DataError::SampleOutOfRange(value as i64));
        }
        Ok(Sample(value))
    }

    /// Clamps values above 9 instead of rejecting them.
    pub fn saturating(value: u8) -> Self {
        Sample(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn category(self) -> Category {
        Category::classify(self)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl TryFrom<u8> for Sample {
    type Error = DataError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Sample::new(value)
    }
}

impl From<Sample> for u8 {
    fn from(sample: Sample) -> u8 {
        sample.0
    }
}

impl FromStr for Sample {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|e| DataError::ParseError(format!("Invalid sample '{}': {}", s, e)))?;
        if !(0..=Self::MAX as i64).contains(&value) {
            return Err(DataError::SampleOutOfRange(value));
        }
        Ok(Sample(value as u8))
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sample as delivered by the data source, tagged with its period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub value: Sample,
    pub period_id: String,
}

impl Observation {
    pub fn new(value: Sample, period_id: impl Into<String>) -> Self {
        Self {
            value,
            period_id: period_id.into(),
        }
    }
}

/// The actual outcome attached to a resolved prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub category: Category,
    pub sample: Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: u64,
    pub predicted: Category,
    pub created_at: DateTime<Utc>,
    pub period_id: Option<String>,
    pub synthetic_sample: Sample,
    pub outcome: Option<Resolution>,
}

impl PredictionRecord {
    pub fn pending(
        id: u64,
        predicted: Category,
        period_id: Option<String>,
        synthetic_sample: Sample,
    ) -> Self {
        Self {
            id,
            predicted,
            created_at: Utc::now(),
            period_id,
            synthetic_sample,
            outcome: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn actual_category(&self) -> Option<Category> {
        self.outcome.map(|o| o.category)
    }

    pub fn actual_sample(&self) -> Option<Sample> {
        self.outcome.map(|o| o.sample)
    }

    /// `Some(true)` for a correct resolved prediction, `None` while pending.
    pub fn is_correct(&self) -> Option<bool> {
        self.outcome.map(|o| o.category == self.predicted)
    }

    /// Attaches the actual outcome. Returns whether the prediction was correct.
    pub fn resolve(&mut self, actual: Sample) -> bool {
        let category = actual.category();
        self.outcome = Some(Resolution {
            category,
            sample: actual,
        });
        category == self.predicted
    }
}
