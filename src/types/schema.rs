//! Ordered feature schema declared by a model artifact

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Allowed numeric range for a single feature (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureDomain {
    pub min: f64,
    pub max: f64,
}

impl FeatureDomain {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Value type a column accepts.
///
/// Columns without a declared kind are binary when they belong to an
/// indicator group and continuous otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Continuous,
    Integer,
    /// 0 or 1.
    Binary,
}

impl FeatureKind {
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            FeatureKind::Continuous => value.is_finite(),
            FeatureKind::Integer => value.is_finite() && value.fract() == 0.0,
            FeatureKind::Binary => value == 0.0 || value == 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Continuous => "a number",
            FeatureKind::Integer => "an integer",
            FeatureKind::Binary => "0 or 1",
        }
    }
}

/// One-hot indicator column belonging to a categorical group.
///
/// For the column `Department_Sales` in group `Department`, `level` is `Sales`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorColumn<'a> {
    pub index: usize,
    pub level: &'a str,
}

/// The exact, ordered column set a model was trained on.
///
/// Fixed at load time: there is no way to reorder, rename or resize it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    domains: HashMap<String, FeatureDomain>,
    kinds: HashMap<String, FeatureKind>,
    /// Columns sharing a `<group>_` prefix with at least one other column,
    /// keyed by group, indices in schema order.
    groups: Vec<(String, Vec<usize>)>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty, blank or duplicated names.
    pub fn new(names: Vec<String>) -> Result<Self, LoadError> {
        if names.is_empty() {
            return Err(LoadError::Shape("feature list is empty".to_string()));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(LoadError::Shape(format!("feature #{index} has a blank name")));
            }
            if positions.insert(name.clone(), index).is_some() {
                return Err(LoadError::Shape(format!("feature '{name}' is declared twice")));
            }
        }

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, name) in names.iter().enumerate() {
            let Some((group, level)) = name.split_once('_') else {
                continue;
            };
            if group.is_empty() || level.is_empty() {
                continue;
            }
            match groups.iter_mut().find(|(g, _)| g == group) {
                Some((_, members)) => members.push(index),
                None => groups.push((group.to_string(), vec![index])),
            }
        }
        groups.retain(|(_, members)| members.len() > 1);

        Ok(Self {
            names,
            positions,
            domains: HashMap::new(),
            kinds: HashMap::new(),
            groups,
        })
    }

    /// Attach numeric domains. Every domain must name a schema column.
    pub fn with_domains(mut self, domains: HashMap<String, FeatureDomain>) -> Result<Self, LoadError> {
        let known: HashSet<&str> = self.names.iter().map(String::as_str).collect();
        for (name, domain) in &domains {
            if !known.contains(name.as_str()) {
                return Err(LoadError::Shape(format!(
                    "domain declared for unknown feature '{name}'"
                )));
            }
            if !(domain.min.is_finite() && domain.max.is_finite()) || domain.min > domain.max {
                return Err(LoadError::Shape(format!(
                    "domain for '{name}' is invalid: [{}, {}]",
                    domain.min, domain.max
                )));
            }
        }
        self.domains = domains;
        Ok(self)
    }

    /// Attach declared value kinds. Every kind must name a schema column.
    pub fn with_kinds(mut self, kinds: HashMap<String, FeatureKind>) -> Result<Self, LoadError> {
        if let Some(name) = kinds.keys().find(|name| !self.positions.contains_key(*name)) {
            return Err(LoadError::Shape(format!(
                "type declared for unknown feature '{name}'"
            )));
        }
        self.kinds = kinds;
        Ok(self)
    }

    /// Feature names in model order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn domain(&self, name: &str) -> Option<&FeatureDomain> {
        self.domains.get(name)
    }

    /// Declared kind, falling back to binary for indicator group members.
    pub fn kind(&self, name: &str) -> FeatureKind {
        if let Some(kind) = self.kinds.get(name) {
            return *kind;
        }
        let grouped = self.position(name).is_some_and(|index| {
            self.groups
                .iter()
                .any(|(_, members)| members.contains(&index))
        });
        if grouped {
            FeatureKind::Binary
        } else {
            FeatureKind::Continuous
        }
    }

    /// Indicator groups with at least two columns, as `(group, indices)`.
    pub fn indicator_groups(&self) -> &[(String, Vec<usize>)] {
        &self.groups
    }

    /// Indicator columns of the form `<group>_<level>`, in schema order.
    pub fn indicator_columns(&self, group: &str) -> Vec<IndicatorColumn<'_>> {
        let prefix = format!("{group}_");
        self.names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                name.strip_prefix(&prefix)
                    .filter(|level| !level.is_empty())
                    .map(|level| IndicatorColumn { index, level })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_keeps_declared_order() {
        let schema = FeatureSchema::new(names(&["OverTime", "Age", "JobLevel"])).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.names()[0], "OverTime");
        assert_eq!(schema.position("Age"), Some(1));
        assert_eq!(schema.position("Salary"), None);
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert!(matches!(
            FeatureSchema::new(names(&["Age", "Age"])),
            Err(LoadError::Shape(_))
        ));
        assert!(matches!(FeatureSchema::new(Vec::new()), Err(LoadError::Shape(_))));
        assert!(matches!(
            FeatureSchema::new(names(&["Age", " "])),
            Err(LoadError::Shape(_))
        ));
    }

    #[test]
    fn test_indicator_columns() {
        let schema = FeatureSchema::new(names(&[
            "Age",
            "Department_Human_Resources",
            "BusinessTravel_NonTravel",
            "Department_Sales",
        ]))
        .unwrap();

        let dept = schema.indicator_columns("Department");
        assert_eq!(
            dept,
            vec![
                IndicatorColumn { index: 1, level: "Human_Resources" },
                IndicatorColumn { index: 3, level: "Sales" },
            ]
        );
        assert!(schema.indicator_columns("Age").is_empty());
        assert!(schema.indicator_columns("JobRole").is_empty());
    }

    #[test]
    fn test_indicator_groups_and_kinds() {
        let schema = FeatureSchema::new(names(&[
            "Age",
            "OverTime",
            "Department_Human_Resources",
            "BusinessTravel_NonTravel",
            "Department_Sales",
            "BusinessTravel_Travel_Rarely",
            "Gender_Male",
        ]))
        .unwrap();

        assert_eq!(
            schema.indicator_groups(),
            &[
                ("Department".to_string(), vec![2, 4]),
                ("BusinessTravel".to_string(), vec![3, 5]),
            ]
        );
        assert_eq!(schema.kind("Department_Sales"), FeatureKind::Binary);
        assert_eq!(schema.kind("Gender_Male"), FeatureKind::Continuous);
        assert_eq!(schema.kind("Age"), FeatureKind::Continuous);

        let mut kinds = HashMap::new();
        kinds.insert("Age".to_string(), FeatureKind::Integer);
        kinds.insert("OverTime".to_string(), FeatureKind::Binary);
        kinds.insert("Gender_Male".to_string(), FeatureKind::Binary);
        let schema = schema.with_kinds(kinds).unwrap();
        assert_eq!(schema.kind("Age"), FeatureKind::Integer);
        assert_eq!(schema.kind("OverTime"), FeatureKind::Binary);
        assert_eq!(schema.kind("Gender_Male"), FeatureKind::Binary);

        let mut bad = HashMap::new();
        bad.insert("Salary".to_string(), FeatureKind::Integer);
        assert!(schema.with_kinds(bad).is_err());
    }

    #[test]
    fn test_kind_accepts() {
        assert!(FeatureKind::Integer.accepts(35.0));
        assert!(!FeatureKind::Integer.accepts(35.7));
        assert!(FeatureKind::Binary.accepts(1.0));
        assert!(!FeatureKind::Binary.accepts(0.5));
        assert!(!FeatureKind::Binary.accepts(7.0));
        assert!(FeatureKind::Continuous.accepts(6000.25));
    }

    #[test]
    fn test_domains_must_reference_known_features() {
        let schema = FeatureSchema::new(names(&["Age"])).unwrap();

        let mut ok = HashMap::new();
        ok.insert("Age".to_string(), FeatureDomain { min: 18.0, max: 60.0 });
        let schema = schema.with_domains(ok).unwrap();
        assert!(schema.domain("Age").unwrap().contains(60.0));
        assert!(!schema.domain("Age").unwrap().contains(61.0));

        let mut bad = HashMap::new();
        bad.insert("Salary".to_string(), FeatureDomain { min: 0.0, max: 1.0 });
        assert!(schema.with_domains(bad).is_err());
    }
}
