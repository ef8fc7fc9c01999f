//! Error taxonomy for model loading, feature assembly and prediction.
//!
//! Each stage has its own error type so callers can tell a broken artifact
//! from a malformed request or a failing classifier.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The model artifact could not be turned into a usable [`ModelArtifact`].
///
/// [`ModelArtifact`]: crate::models::ModelArtifact
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model artifact not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact has an invalid shape: {0}")]
    Shape(String),

    #[error("classifier kind '{0}' is not supported by this build")]
    UnsupportedClassifier(String),

    #[error("failed to initialise ONNX session: {0}")]
    Onnx(String),

    #[error("model loading task failed: {0}")]
    Task(String),
}

/// The raw input does not cover the feature schema exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct SchemaMismatchError {
    /// Schema columns that received no value, in schema order.
    pub missing: Vec<String>,
    /// Input keys that match neither a column nor an indicator group.
    pub unexpected: Vec<String>,
    /// Columns that were given a value more than once.
    pub duplicated: Vec<String>,
}

impl SchemaMismatchError {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.duplicated.is_empty()
    }
}

impl fmt::Display for SchemaMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing fields: {}", self.missing.join(", ")));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("unexpected fields: {}", self.unexpected.join(", ")));
        }
        if !self.duplicated.is_empty() {
            parts.push(format!("duplicated fields: {}", self.duplicated.join(", ")));
        }
        write!(f, "input does not match the model schema ({})", parts.join("; "))
    }
}

/// Feature assembly failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("field '{field}' has an invalid value: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field '{field}' = {value} is outside the allowed range [{min}, {max}]")]
    OutOfDomain {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Inference failures for an already assembled row.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("row has {got} columns but the model expects {expected}")]
    Misaligned { expected: usize, got: usize },

    #[error("feature '{feature}' is not a finite number")]
    NonFinite { feature: String },

    #[error("classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Everything that can stop a prediction request, kept distinguishable by kind.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl ServiceError {
    /// Short label used for logging and failure counters.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Load(_) => "load",
            ServiceError::Assembly(_) => "assembly",
            ServiceError::Prediction(_) => "prediction",
        }
    }
}

/// The exploratory dataset could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset {source_name}: {source}")]
    Http {
        source_name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] csv::Error),

    #[error("dataset row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("dataset loading task failed: {0}")]
    Task(String),
}
