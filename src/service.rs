//! Request-to-prediction pipeline

use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::error::ApiError;
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::ServiceMetrics;
use crate::models::adapter::ModelAdapter;
use crate::types::prediction::{BatchResponse, PredictionResponse, MAX_BATCH_SIZE};
use crate::types::transaction::Transaction;

/// Scores transactions: validate, derive features, run the model, shape the
/// response, track metrics. All collaborators are injected at construction.
pub struct PredictionService {
    adapter: Arc<ModelAdapter>,
    extractor: FeatureExtractor,
    metrics: Arc<ServiceMetrics>,
    /// Decision threshold; probabilities above it classify as fraud
    threshold: f64,
}

impl PredictionService {
    /// Create a service over a model adapter and shared metrics.
    pub fn new(adapter: Arc<ModelAdapter>, metrics: Arc<ServiceMetrics>, threshold: f64) -> Self {
        Self {
            adapter,
            extractor: FeatureExtractor::new(),
            metrics,
            threshold,
        }
    }

    /// The configured decision threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a single transaction.
    pub fn predict(&self, tx: &Transaction) -> Result<PredictionResponse, ApiError> {
        if let Err(message) = tx.validate() {
            self.metrics.record_error();
            return Err(ApiError::Validation(message));
        }

        if !self.adapter.is_loaded() {
            self.metrics.record_error();
            return Err(ApiError::ModelUnavailable);
        }

        let start = Instant::now();

        let features = self.extractor.extract(tx);
        let probability = match self.adapter.predict(&features) {
            Ok(p) => p,
            Err(e) => {
                self.metrics.record_error();
                return Err(ApiError::Internal(e));
            }
        };

        let is_fraud = probability > self.threshold;
        let confidence = self.confidence(probability);
        let elapsed = start.elapsed();

        self.metrics.record_prediction(elapsed, is_fraud);

        debug!(
            fraud_probability = probability,
            is_fraud,
            confidence,
            processing_time_us = elapsed.as_micros(),
            "Transaction scored"
        );

        Ok(PredictionResponse::new(
            probability,
            is_fraud,
            confidence,
            elapsed.as_secs_f64() * 1000.0,
        ))
    }

    /// Score a batch of transactions.
    ///
    /// The whole batch is validated before any transaction is scored, so a
    /// single invalid entry rejects the request.
    pub fn predict_batch(&self, transactions: &[Transaction]) -> Result<BatchResponse, ApiError> {
        if transactions.len() > MAX_BATCH_SIZE {
            self.metrics.record_error();
            return Err(ApiError::Validation(format!(
                "Maximum {} transactions per batch",
                MAX_BATCH_SIZE
            )));
        }

        for tx in transactions {
            if let Err(message) = tx.validate() {
                self.metrics.record_error();
                return Err(ApiError::Validation(message));
            }
        }

        if !self.adapter.is_loaded() {
            self.metrics.record_error();
            return Err(ApiError::ModelUnavailable);
        }

        let start = Instant::now();
        let mut predictions = Vec::with_capacity(transactions.len());
        let mut total_fraud = 0usize;

        for tx in transactions {
            let features = self.extractor.extract(tx);
            let probability = match self.adapter.predict(&features) {
                Ok(p) => p,
                Err(e) => {
                    self.metrics.record_error();
                    return Err(ApiError::Internal(e));
                }
            };

            let is_fraud = probability > self.threshold;
            if is_fraud {
                total_fraud += 1;
            }

            // Individual latency is not tracked within a batch.
            predictions.push(PredictionResponse::new(
                probability,
                is_fraud,
                self.confidence(probability),
                0.0,
            ));
        }

        let elapsed = start.elapsed();
        self.metrics
            .record_batch(elapsed, transactions.len() as u64, total_fraud as u64);

        Ok(BatchResponse {
            total_transactions: predictions.len(),
            total_fraud_detected: total_fraud,
            predictions,
            response_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    /// Distance of the probability from the decision boundary, normalized to
    /// [0, 1]. At the default threshold of 0.5 this is `|p - 0.5| * 2`.
    fn confidence(&self, probability: f64) -> f64 {
        let span = self.threshold.max(1.0 - self.threshold);
        ((probability - self.threshold).abs() / span).clamp(0.0, 1.0)
    }
}
