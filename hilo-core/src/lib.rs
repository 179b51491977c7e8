// hilo-core: adaptive High/Low prediction engine

pub mod config;
pub mod engine;
pub mod regime;
pub mod service;
pub mod stats;
pub mod synth;

pub use engine::{EngineError, EngineMetrics, PredictionEngine, PredictionOutcome, Submission};
pub use regime::{Regime, Rule};
pub use stats::PredictionStats;

// Re-export hilo-common for convenience
pub use hilo_common::{analysis, data, strategy};
