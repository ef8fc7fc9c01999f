//! Aggregates behind the two "key attrition drivers" charts.
//!
//! Rendering belongs to the front-end; this module only computes the
//! numbers a box plot and a grouped bar plot need.

use crate::dataset::{HrRecord, EDUCATION_LABELS};
use serde::Serialize;

/// Five-number summary plus outliers, using linearly interpolated quartiles
/// and whiskers at the last data point within 1.5 IQR of the box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotStats {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Distance-from-home distribution for one (job role, attrition) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceByRole {
    pub job_role: String,
    pub attrition: u8,
    pub stats: BoxPlotStats,
}

/// Average monthly income for one (education level, attrition) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeByEducation {
    pub education_label: String,
    pub attrition: u8,
    pub mean_monthly_income: f64,
    pub count: usize,
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Box plot statistics, `None` for an empty sample.
pub fn box_plot_stats(values: &[f64]) -> Option<BoxPlotStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let reach = 1.5 * (q3 - q1);
    let (low_fence, high_fence) = (q1 - reach, q3 + reach);

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxPlotStats {
        count: sorted.len(),
        lower_whisker: inside.first().copied().unwrap_or(q1),
        q1,
        median,
        q3,
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Distance from home by job role and attrition.
///
/// Job roles keep their order of first appearance; attrition 0 precedes 1.
pub fn distance_by_role(records: &[HrRecord]) -> Vec<DistanceByRole> {
    let mut roles: Vec<&str> = Vec::new();
    for record in records {
        if !roles.contains(&record.job_role.as_str()) {
            roles.push(&record.job_role);
        }
    }

    let mut groups = Vec::new();
    for role in roles {
        for attrition in [0u8, 1] {
            let values: Vec<f64> = records
                .iter()
                .filter(|r| r.job_role == role && r.attrition == attrition)
                .map(|r| r.distance_from_home)
                .collect();
            if let Some(stats) = box_plot_stats(&values) {
                groups.push(DistanceByRole {
                    job_role: role.to_string(),
                    attrition,
                    stats,
                });
            }
        }
    }
    groups
}

/// Average monthly income by education level and attrition, in education order.
pub fn income_by_education(records: &[HrRecord]) -> Vec<IncomeByEducation> {
    let mut bars = Vec::new();
    for label in EDUCATION_LABELS {
        for attrition in [0u8, 1] {
            let incomes: Vec<f64> = records
                .iter()
                .filter(|r| r.education_label == label && r.attrition == attrition)
                .map(|r| r.monthly_income)
                .collect();
            if incomes.is_empty() {
                continue;
            }
            bars.push(IncomeByEducation {
                education_label: label.to_string(),
                attrition,
                mean_monthly_income: incomes.iter().sum::<f64>() / incomes.len() as f64,
                count: incomes.len(),
            });
        }
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::education_label;

    fn record(role: &str, distance: f64, attrition: u8, education: u8, income: f64) -> HrRecord {
        HrRecord {
            job_role: role.to_string(),
            distance_from_home: distance,
            attrition,
            education,
            education_label: education_label(education).unwrap(),
            monthly_income: income,
        }
    }

    #[test]
    fn test_box_plot_quartiles() {
        let stats = box_plot_stats(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_plot_outliers() {
        let stats = box_plot_stats(&[2.0, 3.0, 3.0, 4.0, 29.0]).unwrap();
        // q1 = 3, q3 = 4, fences at 1.5 and 5.5
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![29.0]);
        assert!(box_plot_stats(&[]).is_none());
    }

    #[test]
    fn test_distance_by_role_groups() {
        let records = vec![
            record("Sales Executive", 1.0, 1, 2, 5000.0),
            record("Research Scientist", 8.0, 0, 1, 4000.0),
            record("Sales Executive", 10.0, 0, 3, 6000.0),
            record("Sales Executive", 3.0, 1, 3, 7000.0),
        ];

        let groups = distance_by_role(&records);
        let keys: Vec<(&str, u8)> = groups
            .iter()
            .map(|g| (g.job_role.as_str(), g.attrition))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Sales Executive", 0),
                ("Sales Executive", 1),
                ("Research Scientist", 0)
            ]
        );
        assert_eq!(groups[1].stats.count, 2);
        assert_eq!(groups[1].stats.median, 2.0);
    }

    #[test]
    fn test_income_by_education_means() {
        let records = vec![
            record("A", 1.0, 0, 4, 9000.0),
            record("A", 1.0, 0, 4, 7000.0),
            record("A", 1.0, 1, 4, 3000.0),
            record("A", 1.0, 0, 1, 2500.0),
        ];

        let bars = income_by_education(&records);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].education_label, "Below College");
        assert_eq!(bars[1].education_label, "Master");
        assert_eq!(bars[1].attrition, 0);
        assert_eq!(bars[1].mean_monthly_income, 8000.0);
        assert_eq!(bars[1].count, 2);
        assert_eq!(bars[2].attrition, 1);
    }
}
