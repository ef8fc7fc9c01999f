//! Dashboard backend: sidebar widget definitions and result banners

use crate::error::{AssemblyError, ServiceError};
use crate::types::{round_probability, EmployeeProfile, PredictionResult, RawInput};
use serde::Serialize;
use serde_json::Value;

/// Input control kind and its domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKind {
    Slider { min: i64, max: i64, default: i64 },
    NumberInput { min: i64, max: i64, default: i64 },
    Select { options: Vec<&'static str> },
}

/// One sidebar control, bound to a feature or category group name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub field: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

impl Widget {
    fn slider(field: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            field,
            label,
            kind: WidgetKind::Slider { min, max, default },
        }
    }

    fn select(field: &'static str, label: &'static str, options: &[&'static str]) -> Self {
        Self {
            field,
            label,
            kind: WidgetKind::Select {
                options: options.to_vec(),
            },
        }
    }

    /// Check a submitted value against this widget's domain.
    fn check(&self, value: Option<&Value>) -> Result<(), AssemblyError> {
        let invalid = |reason: String| AssemblyError::InvalidValue {
            field: self.field.to_string(),
            reason,
        };
        let value = value.ok_or_else(|| invalid("no value submitted".to_string()))?;

        match &self.kind {
            WidgetKind::Slider { min, max, .. } | WidgetKind::NumberInput { min, max, .. } => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| invalid(format!("expected a number, got {value}")))?;
                let (min, max) = (*min as f64, *max as f64);
                if number < min || number > max {
                    return Err(AssemblyError::OutOfDomain {
                        field: self.field.to_string(),
                        value: number,
                        min,
                        max,
                    });
                }
                Ok(())
            }
            WidgetKind::Select { options } => match value.as_str() {
                Some(choice) if options.contains(&choice) => Ok(()),
                _ => Err(invalid(format!(
                    "{value} is not one of: {}",
                    options.join(", ")
                ))),
            },
        }
    }
}

/// Sidebar controls in display order.
pub fn widgets() -> Vec<Widget> {
    vec![
        Widget::slider("Age", "Age", 18, 60, 35),
        Widget {
            field: "MonthlyIncome",
            label: "Monthly Income",
            kind: WidgetKind::NumberInput {
                min: 1000,
                max: 20000,
                default: 6000,
            },
        },
        Widget::select("OverTime", "OverTime", &["Yes", "No"]),
        Widget::slider("JobLevel", "Job Level", 1, 5, 2),
        Widget::slider("TotalWorkingYears", "Total Working Years", 0, 40, 10),
        Widget::slider("YearsAtCompany", "Years at Company", 0, 20, 5),
        Widget::select(
            "BusinessTravel",
            "Business Travel",
            &["Travel_Rarely", "Travel_Frequently", "Non-Travel"],
        ),
        Widget::select(
            "Department",
            "Department",
            &["Sales", "Research & Development", "Human Resources"],
        ),
    ]
}

/// Validate a submitted profile against the widget domains and flatten it
/// into raw input for feature assembly.
pub fn profile_to_raw_input(profile: &EmployeeProfile) -> Result<RawInput, AssemblyError> {
    let raw = profile.to_raw_input();
    for widget in widgets() {
        widget.check(raw.get(widget.field))?;
    }
    Ok(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Success,
    Warning,
    Error,
}

/// Message shown under the predict button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Banner {
    pub fn from_result(result: &PredictionResult) -> Self {
        let probability = round_probability(result.probability);
        let (level, verdict) = if result.is_at_risk() {
            (BannerLevel::Warning, "Employee is at risk of leaving")
        } else {
            (BannerLevel::Success, "Employee is likely to stay")
        };

        Self {
            level,
            message: format!("{verdict} (probability of attrition: {probability:.4})"),
            prediction: Some(result.label),
            probability: Some(probability),
        }
    }

    pub fn from_error(err: &ServiceError) -> Self {
        match err {
            ServiceError::Load(_) => Self::error("Error loading model"),
            other => Self::error(other.to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
            prediction: None,
            probability: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, PredictionError};
    use serde_json::json;

    #[test]
    fn test_widget_serialization() {
        let json = serde_json::to_value(widgets()).unwrap();

        assert_eq!(
            json[0],
            json!({"field": "Age", "label": "Age", "type": "slider", "min": 18, "max": 60, "default": 35})
        );
        assert_eq!(json[1]["type"], "number_input");
        assert_eq!(json[7]["options"][1], "Research & Development");
    }

    #[test]
    fn test_default_profile_is_valid() {
        let raw = profile_to_raw_input(&EmployeeProfile::default()).unwrap();
        assert_eq!(raw["BusinessTravel"], json!("Travel_Rarely"));
    }

    #[test]
    fn test_profile_outside_widget_domain() {
        let profile = EmployeeProfile {
            age: 17,
            ..EmployeeProfile::default()
        };
        let err = profile_to_raw_input(&profile).unwrap_err();
        assert!(matches!(err, AssemblyError::OutOfDomain { ref field, .. } if field == "Age"));

        let profile = EmployeeProfile {
            department: "Marketing".to_string(),
            ..EmployeeProfile::default()
        };
        let err = profile_to_raw_input(&profile).unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidValue { ref field, .. } if field == "Department"));
    }

    #[test]
    fn test_banners() {
        let banner = Banner::from_result(&PredictionResult {
            label: 1,
            probability: 0.731249,
        });
        assert_eq!(banner.level, BannerLevel::Warning);
        assert_eq!(banner.probability, Some(0.7312));
        assert!(banner.message.contains("at risk"));

        let banner = Banner::from_result(&PredictionResult {
            label: 0,
            probability: 0.12,
        });
        assert_eq!(banner.level, BannerLevel::Success);

        let banner = Banner::from_error(&ServiceError::Load(LoadError::Shape("x".to_string())));
        assert_eq!(banner.level, BannerLevel::Error);
        assert_eq!(banner.message, "Error loading model");

        let banner = Banner::from_error(&ServiceError::Prediction(PredictionError::Inference(
            "bad dtype".to_string(),
        )));
        assert!(banner.message.contains("bad dtype"));
        assert!(serde_json::to_value(&banner).unwrap().get("probability").is_none());
    }
}
