//! Feature assembly for attrition model inference.
//!
//! Turns a flat set of named input values into the single ordered row the
//! loaded model expects. The column set and order always come from the
//! model's [`FeatureSchema`]; nothing here is hard-coded per front-end.
//!
//! Categorical groups may be supplied either as ready-made indicator
//! columns (`Department_Sales: 1`) or as a category name
//! (`Department: "Sales"`), which is expanded into the group's one-hot
//! columns. A category with no matching column is the reference level and
//! leaves every column of the group at 0.

use crate::error::{AssemblyError, SchemaMismatchError};
use crate::types::{FeatureSchema, RawInput};
use serde_json::Value;
use tracing::debug;

/// One assembled input row, values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: Vec<f32>,
}

impl FeatureRow {
    /// Wrap values that are already in model order.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by feature name.
    pub fn get(&self, schema: &FeatureSchema, name: &str) -> Option<f32> {
        schema
            .position(name)
            .and_then(|idx| self.values.get(idx).copied())
    }
}

/// Assembles raw inputs into rows matching a feature schema.
pub struct FeatureAssembler<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    pub fn feature_names(&self) -> &[String] {
        self.schema.names()
    }

    /// Coerce, expand and reorder `raw` into a [`FeatureRow`].
    ///
    /// Fails with a [`SchemaMismatchError`] naming every missing, unexpected
    /// or duplicated field when the input cannot cover the schema exactly.
    /// Values must then fit their column kind and domain, and at most one
    /// indicator per group may be set.
    pub fn assemble(&self, raw: &RawInput) -> Result<FeatureRow, AssemblyError> {
        let schema = self.schema;
        let mut slots: Vec<Option<f32>> = vec![None; schema.len()];
        let mut mismatch = SchemaMismatchError::default();

        for (key, value) in raw {
            if let Some(index) = schema.position(key) {
                let coerced = coerce(key, value)?;
                fill(&mut slots, index, coerced, schema, &mut mismatch);
                continue;
            }

            let group = schema.indicator_columns(key);
            if group.is_empty() {
                mismatch.unexpected.push(key.clone());
                continue;
            }

            let level = match value {
                Value::String(level) => level.as_str(),
                other => {
                    return Err(AssemblyError::InvalidValue {
                        field: key.clone(),
                        reason: format!("expected a category name, got {}", describe(other)),
                    })
                }
            };

            let wanted = canonical(level);
            let mut matched = false;
            for column in &group {
                let hit = canonical(column.level) == wanted;
                matched |= hit;
                fill(
                    &mut slots,
                    column.index,
                    if hit { 1.0 } else { 0.0 },
                    schema,
                    &mut mismatch,
                );
            }

            if !matched {
                debug!(
                    group = %key,
                    level = %level,
                    columns = group.len(),
                    "Unknown category, using reference level"
                );
            }
        }

        mismatch.missing = schema
            .names()
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        mismatch.unexpected.sort();

        if !mismatch.is_empty() {
            return Err(mismatch.into());
        }

        let values: Vec<f32> = slots.into_iter().flatten().collect();

        for (name, &value) in schema.names().iter().zip(&values) {
            let value = f64::from(value);
            let kind = schema.kind(name);
            if !kind.accepts(value) {
                return Err(AssemblyError::InvalidValue {
                    field: name.clone(),
                    reason: format!("expected {}, got {value}", kind.as_str()),
                });
            }
            if let Some(domain) = schema.domain(name) {
                if !domain.contains(value) {
                    return Err(AssemblyError::OutOfDomain {
                        field: name.clone(),
                        value,
                        min: domain.min,
                        max: domain.max,
                    });
                }
            }
        }

        for (group, members) in schema.indicator_groups() {
            let hot: Vec<&str> = members
                .iter()
                .filter(|&&index| values[index] == 1.0)
                .map(|&index| schema.names()[index].as_str())
                .collect();
            if hot.len() > 1 {
                return Err(AssemblyError::InvalidValue {
                    field: group.clone(),
                    reason: format!("more than one indicator set: {}", hot.join(", ")),
                });
            }
        }

        Ok(FeatureRow { values })
    }
}

/// Convenience wrapper around [`FeatureAssembler::assemble`].
pub fn assemble(raw: &RawInput, schema: &FeatureSchema) -> Result<FeatureRow, AssemblyError> {
    FeatureAssembler::new(schema).assemble(raw)
}

fn fill(
    slots: &mut [Option<f32>],
    index: usize,
    value: f32,
    schema: &FeatureSchema,
    mismatch: &mut SchemaMismatchError,
) {
    if slots[index].replace(value).is_some() {
        let name = &schema.names()[index];
        if !mismatch.duplicated.contains(name) {
            mismatch.duplicated.push(name.clone());
        }
    }
}

/// Coerce a scalar JSON value into a model input.
fn coerce(field: &str, value: &Value) -> Result<f32, AssemblyError> {
    let invalid = |reason: String| AssemblyError::InvalidValue {
        field: field.to_string(),
        reason,
    };

    // Finite f64 values beyond f32 range would overflow to infinity
    let narrow = |v: f64| Some(v as f32).filter(|v| v.is_finite());

    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(narrow)
            .ok_or_else(|| invalid(format!("{n} is not a finite number"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(parsed) = trimmed.parse::<f64>() {
                return narrow(parsed)
                    .ok_or_else(|| invalid(format!("'{s}' is not a finite number")));
            }
            match trimmed.to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(1.0),
                "no" | "false" => Ok(0.0),
                _ => Err(invalid(format!("'{s}' is neither a number nor yes/no"))),
            }
        }
        other => Err(invalid(format!("expected a scalar, got {}", describe(other)))),
    }
}

/// Level names compared without punctuation or case: `Non-Travel` == `NonTravel`.
fn canonical(level: &str) -> String {
    level
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
