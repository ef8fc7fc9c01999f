//! ONNX Runtime classifier backend

use crate::error::{LoadError, PredictionError};
use crate::models::classifier::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Load an ONNX model exported from the training pipeline.
    pub fn load(path: &Path, onnx_threads: usize) -> Result<Self, LoadError> {
        let session =
            build_session(path, onnx_threads).map_err(|e| LoadError::Onnx(format!("{e:#}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            threads = onnx_threads,
            "ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Probability of class 1 from either a tensor or a seq(map) output.
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64, PredictionError> {
        if let Some(output) = outputs.get(self.output_name.as_str()) {
            if let Some(prob) = probability_from_value(output) {
                return Ok(prob);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(prob) = probability_from_value(&output) {
                debug!(output = %name, prob = prob, "Extracted probability (fallback output)");
                return Ok(prob);
            }
        }

        Err(PredictionError::Inference(
            "model produced no probability output".to_string(),
        ))
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict_proba(&self, row: &[f32]) -> Result<f64, PredictionError> {
        let shape = vec![1_i64, row.len() as i64];
        let input = Tensor::from_array((shape, row.to_vec()))
            .map_err(|e| PredictionError::Inference(format!("failed to build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictionError::Inference(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| PredictionError::Inference(e.to_string()))?;

        self.extract_probability(&outputs)
    }
}

fn build_session(path: &Path, onnx_threads: usize) -> Result<Session> {
    ort::init().commit()?;

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(onnx_threads)?
        .commit_from_file(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;

    Ok(session)
}

fn probability_from_value(output: &DynValue) -> Option<f64> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return positive_class_from_tensor(&dims, data);
    }

    if DynSequenceValueType::can_downcast(&output.dtype()) {
        return positive_class_from_sequence_map(output).ok();
    }

    None
}

/// `[batch, classes]` or `[classes]` tensors; class 1 at index 1.
fn positive_class_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let classes = dims.last().copied().unwrap_or(0);
    match classes {
        c if c >= 2 => data.get(1).map(|&v| f64::from(v)),
        1 => data.first().map(|&v| f64::from(v)),
        _ => None,
    }
}

/// seq(map(int64, float)) as emitted by tree-ensemble converters.
fn positive_class_from_sequence_map(output: &DynValue) -> Result<f64> {
    let allocator = Allocator::default();
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let first = maps
        .first()
        .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;
    let pairs = first.try_extract_key_values::<i64, f32>()?;

    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(f64::from(*prob));
    }
    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - f64::from(*prob));
    }
    Err(anyhow::anyhow!("No probability found in map"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_class_from_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 2], &[0.25, 0.75]), Some(0.75));
        assert_eq!(positive_class_from_tensor(&[2], &[0.4, 0.6]), Some(0.6000000238418579));
        assert_eq!(positive_class_from_tensor(&[1, 1], &[0.5]), Some(0.5));
        assert_eq!(positive_class_from_tensor(&[1, 0], &[]), None);
    }
}
