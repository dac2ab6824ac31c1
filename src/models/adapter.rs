//! Model lifecycle and the inference seam

use anyhow::Result;
use std::path::Path;
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::models::loader::OnnxClassifier;

/// Anything that maps a feature vector to a fraud probability.
///
/// The production implementation wraps an ONNX session; tests substitute
/// stubs through [`ModelAdapter::from_classifier`].
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<f64>;
}

/// Owns the pre-trained classifier artifact for the lifetime of the process.
///
/// A failed artifact load leaves the adapter unloaded instead of aborting:
/// the service keeps running and reports `model_loaded: false` from health
/// checks until an artifact is provided and the process restarted.
pub struct ModelAdapter {
    classifier: Option<Box<dyn Classifier>>,
}

impl ModelAdapter {
    /// Load the configured artifact, degrading to an unloaded adapter on
    /// any failure.
    pub fn load(config: &ModelConfig) -> Self {
        let path = Path::new(&config.path);

        if !path.exists() {
            error!(
                path = %path.display(),
                "Model artifact not found, serving without a model"
            );
            return Self { classifier: None };
        }

        match OnnxClassifier::load(path, config.onnx_threads) {
            Ok(classifier) => {
                info!(path = %path.display(), "Model adapter ready");
                Self {
                    classifier: Some(Box::new(classifier)),
                }
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = ?e,
                    "Failed to load model artifact, serving without a model"
                );
                Self { classifier: None }
            }
        }
    }

    /// Wrap an already-built classifier.
    pub fn from_classifier(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// An adapter with no model, as after a failed load.
    pub fn unloaded() -> Self {
        Self { classifier: None }
    }

    /// Whether a classifier is available for predictions.
    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Fraud probability for the feature vector, clamped to [0, 1].
    pub fn predict(&self, features: &[f32]) -> Result<f64> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No model loaded"))?;

        let probability = classifier.predict(features)?;
        Ok(probability.clamp(0.0, 1.0))
    }
}
