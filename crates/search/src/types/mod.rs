//! Caller-facing query descriptors: filter sets and search options.

pub mod filters;
pub mod options;

pub use filters::{
    FilterEntry, FilterSet, FilterTier, FilterValue, UNSUPPORTED_OPERATORS,
    is_unsupported_operator,
};
pub use options::{InOperation, Pagination, SearchOptions, TextQuery};
