//! HR dataset behind the dashboard's exploratory charts

use crate::error::DatasetError;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Education levels as coded in the dataset (1-based).
pub const EDUCATION_LABELS: [&str; 5] = ["Below College", "College", "Bachelor", "Master", "Doctor"];

/// Label for a 1-based education code.
pub fn education_label(code: u8) -> Option<&'static str> {
    usize::from(code)
        .checked_sub(1)
        .and_then(|idx| EDUCATION_LABELS.get(idx).copied())
}

/// CSV row as published; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "JobRole")]
    job_role: String,
    #[serde(rename = "DistanceFromHome")]
    distance_from_home: f64,
    #[serde(rename = "Attrition")]
    attrition: String,
    #[serde(rename = "Education")]
    education: u8,
    #[serde(rename = "MonthlyIncome")]
    monthly_income: f64,
}

/// One employee record with attrition and education already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct HrRecord {
    pub job_role: String,
    pub distance_from_home: f64,
    /// 1 = left the company
    pub attrition: u8,
    pub education: u8,
    pub education_label: &'static str,
    pub monthly_income: f64,
}

/// Parse the CSV export, mapping `Attrition` Yes/No to 1/0 and
/// `Education` codes to their labels.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<HrRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let line = idx + 2;

        let attrition = match row.attrition.as_str() {
            "Yes" => 1,
            "No" => 0,
            other => {
                return Err(DatasetError::InvalidRow {
                    row: line,
                    reason: format!("Attrition must be Yes or No, got '{other}'"),
                })
            }
        };
        let education_label =
            education_label(row.education).ok_or_else(|| DatasetError::InvalidRow {
                row: line,
                reason: format!("unknown Education code {}", row.education),
            })?;

        records.push(HrRecord {
            job_role: row.job_role,
            distance_from_home: row.distance_from_home,
            attrition,
            education: row.education,
            education_label,
            monthly_income: row.monthly_income,
        });
    }

    Ok(records)
}

/// Fetches the dataset once and keeps it for the process lifetime.
///
/// Failures are not cached; the next request fetches again.
pub struct DatasetLoader {
    source: String,
    client: reqwest::Client,
    records: OnceCell<Arc<Vec<HrRecord>>>,
}

impl DatasetLoader {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            client: reqwest::Client::new(),
            records: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub async fn get(&self) -> Result<Arc<Vec<HrRecord>>, DatasetError> {
        self.records
            .get_or_try_init(|| async {
                let bytes = self.fetch().await.map_err(|e| {
                    warn!(source = %self.source, error = %e, "Dataset unavailable");
                    e
                })?;
                let records = parse_records(&bytes)?;
                info!(source = %self.source, rows = records.len(), "Dataset loaded");
                Ok(Arc::new(records))
            })
            .await
            .cloned()
    }

    async fn fetch(&self) -> Result<Vec<u8>, DatasetError> {
        let is_remote = self.source.starts_with("http://") || self.source.starts_with("https://");
        if is_remote {
            let http_err = |source| DatasetError::Http {
                source_name: self.source.clone(),
                source,
            };
            let response = self
                .client
                .get(&self.source)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_err)?;
            let body = response.bytes().await.map_err(http_err)?;
            return Ok(body.to_vec());
        }

        let path = self.source.clone();
        tokio::task::spawn_blocking(move || std::fs::read(path))
            .await
            .map_err(|e| DatasetError::Task(e.to_string()))?
            .map_err(|source| DatasetError::Io {
                source_name: self.source.clone(),
                source,
            })
    }
}
