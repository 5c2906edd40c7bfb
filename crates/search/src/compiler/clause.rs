//! Query DSL clause tree.
//!
//! Compiler stages produce [`Clause`] values; only the assembler turns them
//! into JSON. Keeping the tree typed until the end lets the assembler merge
//! branches without re-parsing JSON.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// A single query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `{ "match": { field: { "query": ..., "operator": ... } } }`
    Match {
        /// Target field.
        field: String,
        /// Query value.
        query: Value,
        /// Require every analyzed token to match (`"operator": "AND"`).
        all_terms: bool,
    },
    /// `{ "prefix": { field: { "value": ... } } }`
    Prefix {
        /// Target field.
        field: String,
        /// Prefix value.
        value: String,
    },
    /// A nested boolean query.
    Bool(BoolQuery),
}

impl Clause {
    /// Equality on a field: a `match` with the `AND` operator.
    pub fn equality(field: impl Into<String>, value: Value) -> Self {
        Clause::Match {
            field: field.into(),
            query: value,
            all_terms: true,
        }
    }

    /// Free-text match on a field.
    pub fn text_match(field: impl Into<String>, term: impl Into<String>) -> Self {
        Clause::Match {
            field: field.into(),
            query: Value::String(term.into()),
            all_terms: false,
        }
    }

    /// Prefix match on a field.
    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Prefix {
            field: field.into(),
            value: value.into(),
        }
    }

    /// OR-group of equalities, one per value, of which at least one must hold.
    pub fn any_of(field: &str, values: &[Value]) -> Self {
        let should = values
            .iter()
            .map(|v| Clause::equality(field, v.clone()))
            .collect();
        Clause::Bool(BoolQuery {
            should,
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        })
    }

    /// Renders the clause as Query DSL JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Clause::Match {
                field,
                query,
                all_terms,
            } => {
                let mut body = Map::new();
                body.insert("query".to_string(), query.clone());
                if *all_terms {
                    body.insert("operator".to_string(), json!("AND"));
                }
                json!({ "match": { field.as_str(): Value::Object(body) } })
            }
            Clause::Prefix { field, value } => {
                json!({ "prefix": { field.as_str(): { "value": value } } })
            }
            Clause::Bool(query) => json!({ "bool": query.to_value() }),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Body of a `bool` query.
///
/// Empty branches and unset parameters are left out of the rendered JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must all match.
    pub must: Vec<Clause>,
    /// Clauses of which `minimum_should_match` must match.
    pub should: Vec<Clause>,
    /// Minimum number of `should` clauses that must match.
    pub minimum_should_match: Option<u32>,
    /// Relevance boost.
    pub boost: Option<f64>,
}

impl BoolQuery {
    /// Renders the body (without the surrounding `"bool"` key).
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        if let Some(boost) = self.boost {
            body.insert("boost".to_string(), json!(boost));
        }
        if !self.must.is_empty() {
            body.insert(
                "must".to_string(),
                Value::Array(self.must.iter().map(Clause::to_value).collect()),
            );
        }
        if !self.should.is_empty() {
            body.insert(
                "should".to_string(),
                Value::Array(self.should.iter().map(Clause::to_value).collect()),
            );
        }
        if let Some(min) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(min));
        }
        Value::Object(body)
    }
}

impl Serialize for BoolQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
