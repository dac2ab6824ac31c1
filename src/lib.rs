//! Fraud Detection API Library
//!
//! A single-model fraud-scoring HTTP service: transaction feature vectors in,
//! fraud probability and classification out.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod types;

pub use config::AppConfig;
pub use error::ApiError;
pub use feature_extractor::FeatureExtractor;
pub use metrics::ServiceMetrics;
pub use models::adapter::{Classifier, ModelAdapter};
pub use server::AppState;
pub use service::PredictionService;
pub use types::{PredictionResponse, Transaction};
