//! Filter compiler.
//!
//! Every entry of a [`FilterSet`] becomes at most one `must` clause:
//!
//! - a scalar value compiles to an equality (`match` with `AND`);
//! - a non-empty list compiles to an OR-group of equalities with
//!   `minimum_should_match: 1`;
//! - an empty list compiles to nothing.
//!
//! Known-tier entries are checked against the entity mapping first. Raw-tier
//! entries are emitted exactly as given.

use serde_json::Value;

use crate::error::{SearchResult, UnsupportedOperatorError, ValidationError};
use crate::mapping::loader::json_type_name;
use crate::mapping::{EntitySearchConfig, FieldKind, FieldMapping};
use crate::types::{FilterEntry, FilterSet, FilterTier, FilterValue};

use super::clause::Clause;

/// Compiles a filter set into `must` clauses, in filter order.
pub fn compile_filters(config: &EntitySearchConfig, filters: &FilterSet) -> SearchResult<Vec<Clause>> {
    let mut clauses = Vec::with_capacity(filters.len());

    for entry in filters.entries() {
        if entry.tier == FilterTier::Known {
            validate_entry(config, entry)?;
        }

        match &entry.value {
            FilterValue::Scalar(value) => {
                clauses.push(Clause::equality(&entry.field, value.clone()));
            }
            FilterValue::List(values) if values.is_empty() => {
                tracing::trace!(
                    entity_type = config.entity_type(),
                    field = %entry.field,
                    "Skipping empty membership filter"
                );
            }
            FilterValue::List(values) => {
                clauses.push(Clause::any_of(&entry.field, values));
            }
        }
    }

    Ok(clauses)
}

fn validate_entry(config: &EntitySearchConfig, entry: &FilterEntry) -> SearchResult<()> {
    let mapping = config
        .field(&entry.field)
        .ok_or_else(|| ValidationError::UnknownField {
            entity_type: config.entity_type().to_string(),
            field: entry.field.clone(),
        })?;

    match &entry.value {
        FilterValue::Scalar(value) => validate_value(mapping, value),
        FilterValue::List(values) => values.iter().try_for_each(|v| validate_value(mapping, v)),
    }
}

fn validate_value(mapping: &FieldMapping, value: &Value) -> SearchResult<()> {
    match value {
        Value::Object(object) => {
            if let Some(operator) = object.keys().find(|k| k.starts_with('$')) {
                return Err(UnsupportedOperatorError {
                    operator: operator.clone(),
                    field: mapping.field_name.clone(),
                }
                .into());
            }
            Err(invalid_value(mapping, "expected a scalar, found object"))
        }
        Value::Null | Value::Array(_) => Err(invalid_value(
            mapping,
            format!("expected a scalar, found {}", json_type_name(value)),
        )),
        Value::Bool(_) => Ok(()),
        Value::String(_) | Value::Number(_) if mapping.kind == FieldKind::Boolean => {
            Err(invalid_value(
                mapping,
                format!("boolean field requires a boolean, found {}", json_type_name(value)),
            ))
        }
        Value::String(_) | Value::Number(_) => Ok(()),
    }
}

fn invalid_value(mapping: &FieldMapping, message: impl Into<String>) -> crate::error::SearchError {
    ValidationError::InvalidValue {
        field: mapping.field_name.clone(),
        message: message.into(),
    }
    .into()
}
