// engine/errors.rs

use thiserror::Error;

/// Error types for engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Observation list is empty")]
    EmptyObservations,

    #[error("Prediction {0} is still pending and must be resolved first")]
    PendingUnresolved(u64),

    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),
}
