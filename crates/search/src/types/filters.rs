//! Filter sets.
//!
//! A [`FilterSet`] is an ordered list of field constraints. Each entry is
//! either an equality (`status = "open"`) or a membership constraint
//! (`tag IN ("a", "b")`), and belongs to one of two tiers:
//!
//! - [`FilterTier::Known`] entries must name a field declared in the entity's
//!   mapping and are checked against the field kind.
//! - [`FilterTier::Raw`] entries are passed to the query document as-is. They
//!   are the escape hatch for index fields the mapping does not describe.

use serde_json::Value;

use crate::error::{SearchResult, UnsupportedOperatorError, ValidationError};
use crate::mapping::loader::json_type_name;

/// Filter operators callers commonly send that the compiler cannot translate.
pub const UNSUPPORTED_OPERATORS: &[&str] = &[
    "$gt", "$gte", "$lt", "$lte", "$ne", "$nin", "$not", "$regex", "$like", "$exists",
];

/// Returns true if `key` is an operator the compiler rejects.
pub fn is_unsupported_operator(key: &str) -> bool {
    UNSUPPORTED_OPERATORS.contains(&key)
}

/// How strictly an entry is checked against the entity mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterTier {
    /// Field must be declared in the mapping.
    #[default]
    Known,
    /// Field and value are trusted as given.
    Raw,
}

/// Value side of a filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Equality with a single value.
    Scalar(Value),
    /// Membership in a set of values; an empty list constrains nothing.
    List(Vec<Value>),
}

impl FilterValue {
    /// Builds a filter value from JSON: arrays become membership lists,
    /// anything else an equality.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(values) => FilterValue::List(values),
            other => FilterValue::Scalar(other),
        }
    }
}

/// A single field constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    /// Target field.
    pub field: String,
    /// Constraint value.
    pub value: FilterValue,
    /// Validation tier.
    pub tier: FilterTier,
}

/// Ordered set of field constraints, all of which must hold.
///
/// ```
/// use lookout_search::types::FilterSet;
///
/// let filters = FilterSet::new()
///     .equals("channel_id", "general")
///     .any_of("user_id", vec!["u1", "u2"])
///     .raw_equals("legacy_flag", true);
/// assert_eq!(filters.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality on a mapped field.
    pub fn equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_entry(field, FilterValue::Scalar(value.into()), FilterTier::Known)
    }

    /// Adds a membership constraint on a mapped field.
    pub fn any_of<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.with_entry(field, FilterValue::List(values), FilterTier::Known)
    }

    /// Adds an unvalidated equality.
    pub fn raw_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_entry(field, FilterValue::Scalar(value.into()), FilterTier::Raw)
    }

    /// Adds an unvalidated membership constraint.
    pub fn raw_any_of<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.with_entry(field, FilterValue::List(values), FilterTier::Raw)
    }

    fn with_entry(mut self, field: impl Into<String>, value: FilterValue, tier: FilterTier) -> Self {
        self.push(FilterEntry {
            field: field.into(),
            value,
            tier,
        });
        self
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: FilterEntry) {
        self.entries.push(entry);
    }

    /// Appends all entries of `other`, keeping their order.
    pub fn extend(&mut self, other: FilterSet) {
        self.entries.extend(other.entries);
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a JSON filter object (`{ field: scalar | [scalars] }`) into
    /// entries of the given tier.
    ///
    /// `null` means "no filters". Operator objects such as
    /// `{ "score": { "$gte": 3 } }` are rejected.
    pub fn from_json(json: &Value, tier: FilterTier) -> SearchResult<Self> {
        let object = match json {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => {
                return Err(ValidationError::MalformedOption {
                    option: "filters".to_string(),
                    message: format!("expected an object, found {}", json_type_name(other)),
                }
                .into());
            }
        };

        let mut filters = Self::new();
        for (field, value) in object {
            if let Some(operator) = value
                .as_object()
                .and_then(|o| o.keys().find(|k| k.starts_with('$')))
            {
                return Err(UnsupportedOperatorError {
                    operator: operator.clone(),
                    field: field.clone(),
                }
                .into());
            }
            filters.push(FilterEntry {
                field: field.clone(),
                value: FilterValue::from_json(value.clone()),
                tier,
            });
        }
        Ok(filters)
    }
}
