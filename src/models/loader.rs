//! Model artifact loader

use crate::error::LoadError;
use crate::models::classifier::{Classifier, LogisticClassifier};
use crate::models::inference::ModelArtifact;
use crate::types::{FeatureDomain, FeatureKind, FeatureSchema};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk artifact: the classifier and the ordered feature list it was
/// trained on, stored together so they can never drift apart.
#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(default = "default_model_name")]
    name: String,
    feature_names: Vec<String>,
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default)]
    domains: HashMap<String, FeatureDomain>,
    #[serde(default)]
    types: HashMap<String, FeatureKind>,
    classifier: ClassifierSpec,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ClassifierSpec {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// Path is resolved relative to the artifact file.
    Onnx { path: PathBuf },
}

fn default_model_name() -> String {
    "attrition-model".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

/// Loader for model artifacts
#[derive(Debug, Clone)]
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Read, parse and validate an artifact file.
    pub fn load_artifact<P: AsRef<Path>>(&self, path: P) -> Result<ModelArtifact, LoadError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading model artifact");

        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let file: ArtifactFile =
            serde_json::from_slice(&bytes).map_err(|source| LoadError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let artifact = self.build(file, path.parent().unwrap_or_else(|| Path::new(".")))?;

        info!(
            model = %artifact.name(),
            classifier = artifact.classifier_kind(),
            features = artifact.schema().len(),
            threshold = artifact.threshold(),
            "Model artifact loaded"
        );

        Ok(artifact)
    }

    fn build(&self, file: ArtifactFile, base_dir: &Path) -> Result<ModelArtifact, LoadError> {
        let schema = FeatureSchema::new(file.feature_names)?
            .with_domains(file.domains)?
            .with_kinds(file.types)?;

        let classifier: Box<dyn Classifier> = match file.classifier {
            ClassifierSpec::Logistic {
                intercept,
                coefficients,
            } => {
                let clf = LogisticClassifier::new(intercept, coefficients)?;
                if clf.coefficient_count() != schema.len() {
                    return Err(LoadError::Shape(format!(
                        "classifier has {} coefficients but {} features are declared",
                        clf.coefficient_count(),
                        schema.len()
                    )));
                }
                Box::new(clf)
            }
            ClassifierSpec::Onnx { path } => self.load_onnx(&base_dir.join(path))?,
        };

        ModelArtifact::new(file.name, schema, file.threshold, classifier)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let clf = crate::models::onnx::OnnxClassifier::load(path, self.onnx_threads)?;
        Ok(Box::new(clf))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>, LoadError> {
        tracing::warn!(
            path = %path.display(),
            threads = self.onnx_threads,
            "ONNX artifact requested but the onnx feature is disabled"
        );
        Err(LoadError::UnsupportedClassifier("onnx".to_string()))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
