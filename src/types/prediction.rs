//! Prediction result and its API representation

use serde::{Deserialize, Serialize};

/// Number of decimals kept in API responses.
pub const PROBABILITY_DECIMALS: i32 = 4;

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 when the employee is predicted to be at attrition risk
    pub label: u8,
    /// Estimated probability of label 1 (0.0 - 1.0)
    pub probability: f64,
}

impl PredictionResult {
    /// Apply a decision threshold to a positive-class probability.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            label: u8::from(probability >= threshold),
            probability,
        }
    }

    pub fn is_at_risk(&self) -> bool {
        self.label == 1
    }
}

/// JSON body returned by `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub probability: f64,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.label,
            probability: round_probability(result.probability),
        }
    }
}

/// Round to four decimals, halves away from zero (`f64::round`).
pub fn round_probability(probability: f64) -> f64 {
    let scale = 10f64.powi(PROBABILITY_DECIMALS);
    (probability * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_probability() {
        assert_eq!(round_probability(0.123456), 0.1235);
        assert_eq!(round_probability(0.99999), 1.0);
        assert_eq!(round_probability(0.0), 0.0);
        assert_eq!(round_probability(0.5), 0.5);
    }

    #[test]
    fn test_label_from_threshold() {
        assert_eq!(PredictionResult::from_probability(0.5, 0.5).label, 1);
        assert_eq!(PredictionResult::from_probability(0.4999, 0.5).label, 0);
        assert!(PredictionResult::from_probability(0.7, 0.61).is_at_risk());
    }

    #[test]
    fn test_response_serialization() {
        let response = PredictionResponse::from(PredictionResult {
            label: 1,
            probability: 0.645656,
        });

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json, serde_json::json!({"prediction": 1, "probability": 0.6457}));
    }
}
