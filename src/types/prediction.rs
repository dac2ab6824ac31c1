//! Prediction and status wire types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::transaction::Transaction;

/// Result of scoring a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Probability of fraud (0.0 - 1.0)
    pub fraud_probability: f64,

    /// Binary classification against the decision threshold
    pub is_fraud: bool,

    /// Certainty of the classification (0.0 - 1.0), distinct from the probability
    pub confidence: f64,

    /// Wall-clock time spent scoring, in milliseconds
    pub response_time_ms: f64,

    /// Prediction timestamp (RFC 3339)
    pub timestamp: String,
}

impl PredictionResponse {
    /// Create a response stamped with the current time.
    pub fn new(fraud_probability: f64, is_fraud: bool, confidence: f64, response_time_ms: f64) -> Self {
        Self {
            fraud_probability,
            is_fraud,
            confidence,
            response_time_ms,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Batch scoring request, capped at [`MAX_BATCH_SIZE`] transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub transactions: Vec<Transaction>,
}

/// Maximum transactions accepted per batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Result of scoring a batch of transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub predictions: Vec<PredictionResponse>,
    pub total_transactions: usize,
    pub total_fraud_detected: usize,
    pub response_time_ms: f64,
}

/// Health check response. Always served with status 200 so orchestrators can
/// tell "process up" from "ready".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(model_loaded: bool) -> Self {
        Self {
            status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
