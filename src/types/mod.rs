//! Type definitions shared by the prediction API and the dashboard

pub mod employee;
pub mod prediction;
pub mod schema;

pub use employee::{EmployeeProfile, YesNo};
pub use prediction::{round_probability, PredictionResponse, PredictionResult};
pub use schema::{FeatureDomain, FeatureKind, FeatureSchema, IndicatorColumn};

/// A flat set of named input values, as received from a request body or
/// collected from widget state.
pub type RawInput = serde_json::Map<String, serde_json::Value>;
