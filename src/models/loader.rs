//! ONNX artifact loading and probability extraction

use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

use crate::models::adapter::Classifier;

/// ONNX-backed classifier around a single session.
///
/// The session requires exclusive access per inference call, so it sits
/// behind a lock held only for the duration of one `run`.
pub struct OnnxClassifier {
    session: RwLock<Session>,
    /// Input name for the model
    input_name: String,
    /// Output name for probabilities
    output_name: String,
}

impl OnnxClassifier {
    /// Load a classifier from an ONNX artifact on disk.
    pub fn load<P: AsRef<Path>>(path: P, intra_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;
        info!(path = %path.display(), threads = intra_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    /// Extract the fraud probability from the session outputs.
    ///
    /// Handles tensor outputs (XGBoost, RandomForest exports) and
    /// seq(map(int64, float)) outputs (scikit-learn, CatBoost, LightGBM
    /// exports with ZipMap).
    fn extract_probability(&self, outputs: &ort::session::SessionOutputs) -> Result<f64> {
        // First, try the probabilities output by name.
        if let Some(output) = outputs.get(self.output_name.as_str()) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = prob_from_tensor(&shape, data);
                debug!(prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = prob_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan all outputs, skipping the class label.
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = prob_from_tensor(&shape, data);
                debug!(output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = prob_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        anyhow::bail!("No probability output found in model outputs")
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<f64> {
        use ort::value::Tensor;

        // Input shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        self.extract_probability(&outputs)
    }
}

/// Extract the fraud-class probability from tensor data.
fn prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
    let dims: Vec<i64> = shape.iter().copied().collect();

    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            // [batch, num_classes] - fraud class at index 1
            return data[1] as f64;
        } else if num_classes == 1 {
            // [batch, 1] - single probability
            return data[0] as f64;
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    }

    data.last().map(|&v| v as f64).unwrap_or(0.5)
}

/// Extract the fraud-class probability from a seq(map(int64, float)) output.
fn prob_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    if maps.is_empty() {
        return Err(anyhow::anyhow!("Empty sequence"));
    }

    // Batch size is 1, so the first map is the only one.
    let map_value = &maps[0];
    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    // Class 1 is fraud.
    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            debug!(prob = *prob, "Extracted from seq(map)");
            return Ok(*prob as f64);
        }
    }

    // Only class 0 present: invert it.
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(anyhow::anyhow!("No probability found in map"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_artifact_fails() {
        let result = OnnxClassifier::load("models/does_not_exist.onnx", 1);
        assert!(result.is_err());
    }
}
