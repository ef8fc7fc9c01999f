//! Employee Attrition Predictor Library
//!
//! Serves a pre-trained attrition classifier over HTTP and backs the
//! exploratory HR dashboard. The model artifact carries its own ordered
//! feature schema; every input is assembled against that schema before
//! inference.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod feature_assembly;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod types;

pub use config::AppConfig;
pub use error::{AssemblyError, LoadError, PredictionError, SchemaMismatchError, ServiceError};
pub use feature_assembly::{assemble, FeatureAssembler, FeatureRow};
pub use models::{ModelArtifact, ModelHandle, ModelLoader};
pub use service::{serve_prediction, PredictionService};
pub use types::{FeatureKind, FeatureSchema, PredictionResponse, PredictionResult, RawInput};
