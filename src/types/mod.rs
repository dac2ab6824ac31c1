//! Type definitions for the fraud detection API

pub mod prediction;
pub mod transaction;

pub use prediction::{BatchRequest, BatchResponse, HealthResponse, PredictionResponse};
pub use transaction::{DerivedFeatures, Transaction};
