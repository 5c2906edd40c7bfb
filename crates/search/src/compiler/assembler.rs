//! Query assembler.
//!
//! Resolves the entity configuration, runs the filter and text compilers and
//! merges their clauses into a single root `bool` query.

use std::collections::BTreeSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::SearchResult;
use crate::mapping::EntityRegistry;
use crate::types::{FilterSet, FilterTier, Pagination, SearchOptions};

use super::clause::BoolQuery;
use super::filter::compile_filters;
use super::text::compile_text_search;

/// HTTP status tolerated by default when the compiled query is executed.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Transient retries allowed by default.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Relevance boost of the root query.
pub const ROOT_BOOST: f64 = 1.0;

/// How the caller should execute a compiled query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOptions {
    /// Response statuses treated as an empty result instead of a failure.
    pub ignore: BTreeSet<u16>,
    /// Number of retries on transient transport failures.
    pub max_retries: u32,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            ignore: BTreeSet::from([NOT_FOUND_STATUS]),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ExecutionOptions {
    /// Returns true if a response with `status` should not be treated as an error.
    pub fn tolerates(&self, status: u16) -> bool {
        self.ignore.contains(&status)
    }
}

/// A compiled query document.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    /// Root boolean query.
    pub root: BoolQuery,
    /// Page size.
    pub size: Option<u64>,
    /// Page offset.
    pub from: Option<u64>,
}

impl QueryDocument {
    /// Renders the request body: `{ "query": { "bool": ... }, "size"?, "from"? }`.
    pub fn to_value(&self) -> Value {
        let mut body = json!({ "query": { "bool": self.root.to_value() } });
        if let Some(size) = self.size {
            body["size"] = json!(size);
        }
        if let Some(from) = self.from {
            body["from"] = json!(from);
        }
        body
    }
}

/// Output of [`QueryAssembler::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSearch {
    /// Index the query targets.
    pub index: String,
    /// Compiled query document.
    pub query: QueryDocument,
    /// Execution policy.
    pub options: ExecutionOptions,
}

impl CompiledSearch {
    /// Search request body.
    pub fn body(&self) -> Value {
        self.query.to_value()
    }

    /// Body for a count request: same query, paging removed, `size: 0`.
    pub fn count_body(&self) -> Value {
        let mut body = self.query.to_value();
        if let Some(object) = body.as_object_mut() {
            object.remove("from");
            object.insert("size".to_string(), json!(0));
        }
        body
    }
}

impl Serialize for CompiledSearch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CompiledSearch", 3)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("body", &self.body())?;
        state.serialize_field("options", &self.options)?;
        state.end()
    }
}

/// Compiles entity-agnostic queries against a registry.
///
/// ```
/// use lookout_search::{EntityRegistry, FilterSet, QueryAssembler, SearchOptions};
///
/// let registry = EntityRegistry::with_builtin_entities().unwrap();
/// let assembler = QueryAssembler::new(&registry);
///
/// let compiled = assembler
///     .assemble(
///         "messages",
///         &FilterSet::new().equals("channel_id", "general"),
///         &SearchOptions::new().with_text("Réunion"),
///     )
///     .unwrap();
///
/// let body = compiled.body();
/// assert_eq!(compiled.index, "messages");
/// assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
/// assert_eq!(body["query"]["bool"]["should"][0]["match"]["text"]["query"], "reunion");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryAssembler<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> QueryAssembler<'a> {
    /// Creates an assembler reading from `registry`.
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }

    /// Compiles `filters` and `options` for `entity_type`.
    ///
    /// `must` holds the filter clauses followed by the `$in` and `$raw`
    /// clauses of the options. `should` holds the text clauses. Whenever a
    /// text query is given the root requires `minimum_should_match: 1`, so a
    /// text search on an entity without text fields matches nothing.
    pub fn assemble(
        &self,
        entity_type: &str,
        filters: &FilterSet,
        options: &SearchOptions,
    ) -> SearchResult<CompiledSearch> {
        let config = self.registry.lookup(entity_type)?;

        let mut all_filters = filters.clone();
        all_filters.extend(options.filter_entries());

        let must = compile_filters(&config, &all_filters)?;
        let should = compile_text_search(&config, options.text.as_ref());

        let root = BoolQuery {
            minimum_should_match: options.text.is_some().then_some(1),
            must,
            should,
            boost: Some(ROOT_BOOST),
        };

        let Pagination { limit, offset } = options.pagination;
        let compiled = CompiledSearch {
            index: config.index_name().to_string(),
            query: QueryDocument {
                root,
                size: limit,
                from: offset,
            },
            options: ExecutionOptions::default(),
        };

        tracing::debug!(
            entity_type,
            index = %compiled.index,
            body = %compiled.body(),
            "Compiled search query"
        );

        Ok(compiled)
    }

    /// Parses JSON filters and options, then compiles them.
    pub fn assemble_json(
        &self,
        entity_type: &str,
        filters: &Value,
        options: &Value,
    ) -> SearchResult<CompiledSearch> {
        let filters = FilterSet::from_json(filters, FilterTier::Known)?;
        let options = SearchOptions::from_json(options)?;
        self.assemble(entity_type, &filters, &options)
    }
}
