//! Classifier backends that turn an assembled row into a probability

use crate::error::{LoadError, PredictionError};

/// A trained binary classifier.
///
/// Implementations are read-only after construction and shared across
/// concurrent requests.
pub trait Classifier: Send + Sync {
    /// Backend name used in logs.
    fn kind(&self) -> &'static str;

    /// Probability of the positive (attrition) class for one row.
    fn predict_proba(&self, row: &[f32]) -> Result<f64, PredictionError>;
}

/// Logistic regression exported as an intercept plus one coefficient per feature.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticClassifier {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticClassifier {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self, LoadError> {
        if !intercept.is_finite() {
            return Err(LoadError::Shape("intercept is not finite".to_string()));
        }
        if let Some(idx) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(LoadError::Shape(format!("coefficient #{idx} is not finite")));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn coefficient_count(&self) -> usize {
        self.coefficients.len()
    }

    fn decision_function(&self, row: &[f32]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (&coef, &x)| acc + coef * f64::from(x))
    }
}

impl Classifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn predict_proba(&self, row: &[f32]) -> Result<f64, PredictionError> {
        if row.len() != self.coefficients.len() {
            return Err(PredictionError::Misaligned {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(sigmoid(self.decision_function(row)))
    }
}

/// Logistic function, stable for large negative inputs.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
