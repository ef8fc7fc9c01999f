//! Loaded model artifact and single-row inference

use crate::error::{LoadError, PredictionError};
use crate::feature_assembly::FeatureRow;
use crate::models::classifier::Classifier;
use crate::types::{FeatureSchema, PredictionResult};
use std::fmt;
use tracing::debug;

/// A trained classifier together with the feature schema it expects.
///
/// Immutable once loaded; share it behind an `Arc`.
pub struct ModelArtifact {
    name: String,
    schema: FeatureSchema,
    threshold: f64,
    classifier: Box<dyn Classifier>,
}

impl ModelArtifact {
    pub fn new(
        name: String,
        schema: FeatureSchema,
        threshold: f64,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, LoadError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LoadError::Shape(format!(
                "decision threshold {threshold} is outside [0, 1]"
            )));
        }
        Ok(Self {
            name,
            schema,
            threshold,
            classifier,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Probability at or above which the label is 1.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    /// Run inference on one assembled row.
    ///
    /// Deterministic for a given (artifact, row); never mutates the artifact.
    pub fn predict(&self, row: &FeatureRow) -> Result<PredictionResult, PredictionError> {
        if row.len() != self.schema.len() {
            return Err(PredictionError::Misaligned {
                expected: self.schema.len(),
                got: row.len(),
            });
        }

        if let Some(idx) = row.values().iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::NonFinite {
                feature: self.schema.names()[idx].clone(),
            });
        }

        let probability = self.classifier.predict_proba(row.values())?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InvalidProbability(probability));
        }

        let result = PredictionResult::from_probability(probability, self.threshold);

        debug!(
            model = %self.name,
            probability = probability,
            label = result.label,
            "Inference complete"
        );

        Ok(result)
    }
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("name", &self.name)
            .field("features", &self.schema.len())
            .field("threshold", &self.threshold)
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}
