//! Employee profile collected from the dashboard sidebar

use super::RawInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Yes/No selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

/// Human-readable employee details as entered in the dashboard widgets.
///
/// Categorical fields hold the selected option name; expansion into
/// indicator columns is left to feature assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Age in years
    #[serde(rename = "Age", alias = "age")]
    pub age: i64,

    /// Gross monthly income
    #[serde(rename = "MonthlyIncome", alias = "monthly_income")]
    pub monthly_income: f64,

    /// Whether the employee works overtime
    #[serde(rename = "OverTime", alias = "over_time")]
    pub over_time: YesNo,

    /// Job level (1 = entry, 5 = executive)
    #[serde(rename = "JobLevel", alias = "job_level")]
    pub job_level: i64,

    /// Total years of professional experience
    #[serde(rename = "TotalWorkingYears", alias = "total_working_years")]
    pub total_working_years: i64,

    /// Tenure at the current company
    #[serde(rename = "YearsAtCompany", alias = "years_at_company")]
    pub years_at_company: i64,

    /// Travel_Rarely, Travel_Frequently or Non-Travel
    #[serde(rename = "BusinessTravel", alias = "business_travel")]
    pub business_travel: String,

    /// Sales, Research & Development or Human Resources
    #[serde(rename = "Department", alias = "department")]
    pub department: String,
}

impl EmployeeProfile {
    /// Flatten into raw input keyed by feature and category group names.
    pub fn to_raw_input(&self) -> RawInput {
        let mut raw = RawInput::new();
        raw.insert("Age".to_string(), Value::from(self.age));
        raw.insert("MonthlyIncome".to_string(), Value::from(self.monthly_income));
        raw.insert("OverTime".to_string(), Value::from(self.over_time.as_str()));
        raw.insert("JobLevel".to_string(), Value::from(self.job_level));
        raw.insert(
            "TotalWorkingYears".to_string(),
            Value::from(self.total_working_years),
        );
        raw.insert("YearsAtCompany".to_string(), Value::from(self.years_at_company));
        raw.insert(
            "BusinessTravel".to_string(),
            Value::from(self.business_travel.clone()),
        );
        raw.insert("Department".to_string(), Value::from(self.department.clone()));
        raw
    }
}

impl Default for EmployeeProfile {
    /// The sidebar's initial widget values.
    fn default() -> Self {
        Self {
            age: 35,
            monthly_income: 6000.0,
            over_time: YesNo::Yes,
            job_level: 2,
            total_working_years: 10,
            years_at_company: 5,
            business_travel: "Travel_Rarely".to_string(),
            department: "Sales".to_string(),
        }
    }
}
