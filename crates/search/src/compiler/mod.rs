//! Filter and option compilation into Elasticsearch Query DSL.
//!
//! The pipeline is split in small, pure stages:
//!
//! - [`filter::compile_filters`] turns a [`FilterSet`](crate::types::FilterSet)
//!   into `must` clauses;
//! - [`text::compile_text_search`] turns a [`TextQuery`](crate::types::TextQuery)
//!   into `should` clauses;
//! - [`QueryAssembler`] resolves the entity configuration and merges both into
//!   a [`CompiledSearch`].

pub mod assembler;
pub mod clause;
pub mod filter;
pub mod text;

pub use assembler::{CompiledSearch, ExecutionOptions, QueryAssembler, QueryDocument};
pub use clause::{BoolQuery, Clause};
pub use filter::compile_filters;
pub use text::compile_text_search;
