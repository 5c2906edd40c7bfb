//! Lookout Search
//!
//! This crate compiles entity-agnostic search requests into Elasticsearch
//! Query DSL documents. Which fields of an entity are searchable, and how, is
//! described by a static per-entity declaration; the compiler itself contains
//! no entity-specific logic.
//!
//! # Architecture
//!
//! - [`mapping`] - Search declarations, field mappings and the entity registry
//! - [`normalize`] - Case and diacritic folding of free-text terms
//! - [`types`] - Filter sets and search options supplied by callers
//! - [`compiler`] - Filter, text and query assembly stages
//! - [`entities`] - The [`SearchableEntity`] trait and built-in entities
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use lookout_search::{EntityRegistry, QueryAssembler, SearchDeclaration};
//! use serde_json::json;
//!
//! let mut registry = EntityRegistry::new();
//! registry
//!     .register(
//!         "tasks",
//!         &SearchDeclaration::new()
//!             .text_with_prefixes("title")
//!             .keyword("status"),
//!     )
//!     .unwrap();
//!
//! let compiled = QueryAssembler::new(&registry)
//!     .assemble_json(
//!         "tasks",
//!         &json!({ "status": "open" }),
//!         &json!({ "$text": { "$search": "Café" }, "limit": 10 }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(compiled.index, "tasks");
//! assert_eq!(
//!     compiled.body(),
//!     json!({
//!         "query": {
//!             "bool": {
//!                 "boost": 1.0,
//!                 "must": [
//!                     { "match": { "status": { "query": "open", "operator": "AND" } } }
//!                 ],
//!                 "should": [
//!                     { "match": { "title": { "query": "cafe" } } },
//!                     { "prefix": { "title": { "value": "cafe" } } }
//!                 ],
//!                 "minimum_should_match": 1
//!             }
//!         },
//!         "size": 10
//!     })
//! );
//! ```
//!
//! # Filters
//!
//! Filters come in two tiers. Known filters must name a field declared for the
//! entity and are type-checked; raw filters (`FilterSet::raw_equals`, or the
//! `$raw` option) are emitted without any validation.
//!
//! Operators the compiler cannot express (`$gt`, `$ne`, `$regex`, ...) are
//! rejected with [`UnsupportedOperatorError`] instead of being dropped.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod compiler;
pub mod entities;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod types;

// Re-export commonly used types at crate root
pub use compiler::{CompiledSearch, ExecutionOptions, QueryAssembler, QueryDocument};
pub use entities::SearchableEntity;
pub use error::{
    ConfigurationError, SearchError, SearchResult, UnsupportedOperatorError, ValidationError,
};
pub use mapping::{
    DeclarationLoader, EntityRegistry, EntitySearchConfig, FieldKind, FieldMapping,
    SearchDeclaration,
};
pub use normalize::normalize;
pub use types::{FilterSet, FilterTier, SearchOptions, TextQuery};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
