//! Search options.
//!
//! Options travel next to the filter object and carry the constraints that do
//! not fit a plain `{ field: value }` shape:
//!
//! | Key | Shape | Meaning |
//! |-----|-------|---------|
//! | `$in` | `[[field, [values]], ...]` | Membership constraints (AND-ed with filters) |
//! | `$text` | `{ "$search": "term" }` | Free-text search over text fields |
//! | `$raw` | `{ field: scalar \| [scalars] }` | Unvalidated filters |
//! | `limit` | positive integer or numeric string | Page size |
//! | `page_token` | decimal offset string or integer | Offset of the page |
//!
//! Other keys are ignored, except the operators listed in
//! [`UNSUPPORTED_OPERATORS`](super::filters::UNSUPPORTED_OPERATORS), which
//! fail the request.

use serde_json::{Map, Value};

use crate::error::{SearchResult, UnsupportedOperatorError, ValidationError};
use crate::mapping::loader::json_type_name;
use crate::normalize::normalize;

use super::filters::{FilterEntry, FilterSet, FilterTier, FilterValue, is_unsupported_operator};

/// A free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    /// The term as supplied by the caller.
    pub raw_term: String,
}

impl TextQuery {
    /// Creates a text query.
    pub fn new(raw_term: impl Into<String>) -> Self {
        Self {
            raw_term: raw_term.into(),
        }
    }

    /// The term used in compiled clauses.
    pub fn normalized_term(&self) -> String {
        normalize(&self.raw_term)
    }
}

/// One `$in` entry: a field and its candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct InOperation {
    /// Target field.
    pub field: String,
    /// Candidate values; an empty list adds no constraint.
    pub values: Vec<Value>,
}

/// Page selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of hits to return.
    pub limit: Option<u64>,
    /// Number of hits to skip.
    pub offset: Option<u64>,
}

impl Pagination {
    /// Returns true if neither limit nor offset is set.
    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

/// Structured search options.
///
/// ```
/// use lookout_search::types::SearchOptions;
/// use serde_json::json;
///
/// let options = SearchOptions::from_json(&json!({
///     "$in": [["channel_id", ["general", "random"]]],
///     "$text": { "$search": "Café" },
///     "limit": "25"
/// }))
/// .unwrap();
///
/// assert_eq!(options.in_operations.len(), 1);
/// assert_eq!(options.text.unwrap().normalized_term(), "cafe");
/// assert_eq!(options.pagination.limit, Some(25));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// `$in` membership constraints.
    pub in_operations: Vec<InOperation>,
    /// `$text` query.
    pub text: Option<TextQuery>,
    /// `$raw` filters.
    pub raw_filters: FilterSet,
    /// `limit` / `page_token`.
    pub pagination: Pagination,
}

impl SearchOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `$in` constraint.
    pub fn with_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.in_operations.push(InOperation {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets the `$text` query.
    pub fn with_text(mut self, term: impl Into<String>) -> Self {
        self.text = Some(TextQuery::new(term));
        self
    }

    /// Adds an unvalidated equality filter.
    pub fn with_raw(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw_filters = self.raw_filters.raw_equals(field, value);
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.pagination.limit = Some(limit);
        self
    }

    /// Sets the page offset.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.pagination.offset = Some(offset);
        self
    }

    /// Filter entries contributed by the options: `$in` entries first, then
    /// `$raw` entries.
    pub fn filter_entries(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        for op in &self.in_operations {
            filters.push(FilterEntry {
                field: op.field.clone(),
                value: FilterValue::List(op.values.clone()),
                tier: FilterTier::Known,
            });
        }
        filters.extend(self.raw_filters.clone());
        filters
    }

    /// Parses an options object. `null` yields empty options.
    pub fn from_json(json: &Value) -> SearchResult<Self> {
        let object = match json {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => {
                return Err(malformed(
                    "options",
                    format!("expected an object, found {}", json_type_name(other)),
                ));
            }
        };

        let mut options = Self::new();

        for (key, value) in object {
            match key.as_str() {
                "$in" => options.in_operations = parse_in(value)?,
                "$text" => options.text = Some(parse_text(value)?),
                "$raw" => options.raw_filters = FilterSet::from_json(value, FilterTier::Raw)?,
                "limit" => options.pagination.limit = parse_count("limit", value)?,
                "page_token" => options.pagination.offset = parse_count("page_token", value)?,
                operator if is_unsupported_operator(operator) => {
                    return Err(UnsupportedOperatorError {
                        operator: operator.to_string(),
                        field: first_operand_field(value).unwrap_or_else(|| "*".to_string()),
                    }
                    .into());
                }
                other => {
                    tracing::trace!(option = other, "Ignoring unrecognized search option");
                }
            }
        }

        if options.pagination.limit == Some(0) {
            return Err(malformed("limit", "must be greater than zero"));
        }

        Ok(options)
    }
}

fn malformed(option: &str, message: impl Into<String>) -> crate::error::SearchError {
    ValidationError::MalformedOption {
        option: option.to_string(),
        message: message.into(),
    }
    .into()
}

/// Parses `[[field, [values]], ...]`.
fn parse_in(value: &Value) -> SearchResult<Vec<InOperation>> {
    let entries = value
        .as_array()
        .ok_or_else(|| malformed("$in", "expected a list of [field, values] pairs"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.as_array().map(Vec::as_slice) {
            Some([Value::String(field), Value::Array(values)]) => Ok(InOperation {
                field: field.clone(),
                values: values.clone(),
            }),
            _ => Err(malformed(
                "$in",
                format!("entry {} is not a [field, values] pair: {}", i, entry),
            )),
        })
        .collect()
}

/// Parses `{ "$search": "term" }`; a missing term is the empty term.
fn parse_text(value: &Value) -> SearchResult<TextQuery> {
    let object: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| malformed("$text", "expected an object with a $search term"))?;

    match object.get("$search") {
        None | Some(Value::Null) => Ok(TextQuery::default()),
        Some(Value::String(term)) => Ok(TextQuery::new(term.clone())),
        Some(other) => Err(malformed(
            "$text",
            format!("$search must be a string, found {}", json_type_name(other)),
        )),
    }
}

/// Parses a non-negative count given as an integer or a decimal string.
fn parse_count(option: &str, value: &Value) -> SearchResult<Option<u64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| malformed(option, format!("expected a non-negative integer, found {}", n))),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| malformed(option, format!("expected a non-negative integer, found '{}'", s))),
        other => Err(malformed(
            option,
            format!("expected a non-negative integer, found {}", json_type_name(other)),
        )),
    }
}

/// Best-effort field name of an operator operand such as `[["date", 3]]`.
fn first_operand_field(value: &Value) -> Option<String> {
    match value {
        Value::Array(entries) => entries
            .first()
            .and_then(Value::as_array)
            .and_then(|pair| pair.first())
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Object(object) => object.keys().next().cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::SearchError;

    #[test]
    fn test_parse_full_options() {
        let options = SearchOptions::from_json(&json!({
            "$in": [["tag", ["a", "b"]], ["user_id", []]],
            "$text": { "$search": "Hello" },
            "$raw": { "legacy": true },
            "limit": 10,
            "page_token": "20"
        }))
        .unwrap();

        assert_eq!(options.in_operations.len(), 2);
        assert_eq!(options.in_operations[0].field, "tag");
        assert!(options.in_operations[1].values.is_empty());
        assert_eq!(options.text, Some(TextQuery::new("Hello")));
        assert_eq!(options.raw_filters.len(), 1);
        assert_eq!(options.pagination.limit, Some(10));
        assert_eq!(options.pagination.offset, Some(20));
    }

    #[test]
    fn test_null_options() {
        assert_eq!(SearchOptions::from_json(&Value::Null).unwrap(), SearchOptions::new());
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let options = SearchOptions::from_json(&json!({ "$sort": { "date": "desc" }, "foo": 1 }))
            .unwrap();
        assert_eq!(options, SearchOptions::new());
    }

    #[test]
    fn test_malformed_in_entry() {
        let err = SearchOptions::from_json(&json!({ "$in": [["tag", "a"]] })).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Validation(ValidationError::MalformedOption { ref option, .. }) if option == "$in"
        ));

        let err = SearchOptions::from_json(&json!({ "$in": [["tag"]] })).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));

        let err = SearchOptions::from_json(&json!({ "$in": { "tag": ["a"] } })).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }

    #[test]
    fn test_text_without_search_is_empty_term() {
        let options = SearchOptions::from_json(&json!({ "$text": {} })).unwrap();
        assert_eq!(options.text, Some(TextQuery::new("")));
    }

    #[test]
    fn test_text_with_non_string_search() {
        let err = SearchOptions::from_json(&json!({ "$text": { "$search": 42 } })).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }

    #[test]
    fn test_unsupported_operator_option() {
        let err = SearchOptions::from_json(&json!({ "$gte": [["created_at", 1700000000]] }))
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::UnsupportedOperator(UnsupportedOperatorError {
                operator: "$gte".to_string(),
                field: "created_at".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_page_token() {
        let err = SearchOptions::from_json(&json!({ "page_token": "abc" })).unwrap_err();
        assert!(err.to_string().contains("page_token"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(SearchOptions::from_json(&json!({ "limit": 0 })).is_err());
    }

    #[test]
    fn test_filter_entries_order() {
        let options = SearchOptions::new()
            .with_raw("legacy", true)
            .with_in("tag", vec!["a"]);
        let filters = options.filter_entries();
        assert_eq!(filters.entries()[0].field, "tag");
        assert_eq!(filters.entries()[0].tier, FilterTier::Known);
        assert_eq!(filters.entries()[1].field, "legacy");
        assert_eq!(filters.entries()[1].tier, FilterTier::Raw);
    }

    #[test]
    fn test_normalized_term() {
        assert_eq!(TextQuery::new("Crème BRÛLÉE").normalized_term(), "creme brulee");
    }
}
