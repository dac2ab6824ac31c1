//! Feature extraction for fraud model inference.
//!
//! This module derives the engineered fields and assembles the model input
//! vector in the order used during training.

use chrono::{Datelike, Local, Timelike};

use crate::types::transaction::{DerivedFeatures, Transaction};

/// Feature extractor that transforms transactions into model input features.
///
/// Features are assembled in the exact order expected by the model artifact.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Compute the derived fields from raw transaction values.
    ///
    /// Deterministic; all inputs are pre-validated numerics.
    pub fn derive(&self, tx: &Transaction) -> DerivedFeatures {
        let high_failure_flag = if tx.failed_transaction_count_7d > 0.0 {
            1.0
        } else {
            0.0
        };

        // Guard the denominator: no daily activity means no failure rate.
        let failure_rate = if tx.daily_transaction_count > 0 {
            tx.failed_transaction_count_7d / tx.daily_transaction_count as f64
        } else {
            0.0
        };

        let amount_deviation = (tx.transaction_amount - tx.avg_transaction_amount_7d).abs();
        let risk_amount_interaction = tx.risk_score * tx.transaction_amount;

        DerivedFeatures {
            high_failure_flag,
            failure_rate,
            amount_deviation,
            risk_amount_interaction,
        }
    }

    /// Assemble the model input vector (11 features, training order).
    ///
    /// `hour` and `month` fall back to the current local time when the
    /// transaction does not carry them.
    pub fn extract(&self, tx: &Transaction) -> Vec<f32> {
        let derived = self.derive(tx);
        let now = Local::now();
        let hour = tx.hour.unwrap_or(now.hour());
        let month = tx.month.unwrap_or(now.month());

        let mut features = Vec::with_capacity(self.feature_count());
        features.push(tx.failed_transaction_count_7d as f32);
        features.push(tx.risk_score as f32);
        features.push(derived.high_failure_flag as f32);
        features.push(tx.transaction_amount as f32);
        features.push(tx.avg_transaction_amount_7d as f32);
        features.push(derived.risk_amount_interaction as f32);
        features.push(derived.amount_deviation as f32);
        features.push(derived.failure_rate as f32);
        features.push(hour as f32);
        features.push(tx.card_age as f32);
        features.push(month as f32);

        features
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        11
    }

    /// Get feature names (matching training order).
    pub fn feature_names(&self) -> Vec<&'static str> {
        vec![
            "Failed_Transaction_Count_7d",
            "Risk_Score",
            "High_Failure_Flag",
            "Transaction_Amount",
            "Avg_Transaction_Amount_7d",
            "Risk_Amount_Interaction",
            "Amount_Deviation",
            "Failure_Rate",
            "Hour",
            "Card_Age",
            "Month",
        ]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
