pub mod analysis;
pub mod data;
pub mod strategy;

pub use data::types::{Category, DataError, Observation, PredictionRecord, Resolution, Sample};
