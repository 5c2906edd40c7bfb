//! Error types for the search compiler.
//!
//! Errors are grouped by category: configuration problems (missing or invalid
//! entity declarations), unsupported filter operators, and malformed caller
//! input. All of them are raised synchronously by the compiler and none of them
//! is worth retrying, since the inputs that caused them are static.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all compile operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Entity search configuration errors
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Filter operators the compiler cannot translate
    #[error(transparent)]
    UnsupportedOperator(#[from] UnsupportedOperatorError),

    /// Malformed filters or options
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SearchError {
    /// Returns true if repeating the same call could succeed.
    ///
    /// Compile errors come from static configuration or caller input, so this
    /// is always false. Transport retries belong to the caller executing the
    /// compiled query (see [`ExecutionOptions`](crate::compiler::ExecutionOptions)).
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns the HTTP status a caller would typically surface for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::Configuration(_) => 500,
            SearchError::UnsupportedOperator(_) | SearchError::Validation(_) => 400,
        }
    }
}

/// Errors related to entity search declarations and their lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No search configuration is registered for the entity type.
    #[error("no search configuration registered for entity type '{entity_type}'")]
    UnknownEntity { entity_type: String },

    /// The entity type was registered twice.
    #[error("search configuration for entity type '{entity_type}' already registered")]
    DuplicateEntity { entity_type: String },

    /// A field was declared more than once for the same entity.
    #[error("field '{field}' declared more than once for entity type '{entity_type}'")]
    DuplicateField { entity_type: String, field: String },

    /// A field declaration uses a mapping type the compiler does not support.
    #[error("field '{field}' of entity type '{entity_type}' has unsupported type '{field_type}'")]
    UnsupportedFieldType {
        entity_type: String,
        field: String,
        field_type: String,
    },

    /// The declaration itself is structurally invalid.
    #[error("invalid search declaration for '{entity_type}': {message}")]
    InvalidDeclaration {
        entity_type: String,
        message: String,
    },

    /// A declarations file could not be read or parsed.
    #[error("failed to load search declarations from '{path}': {message}")]
    LoadFailed { path: String, message: String },
}

/// A filter operator with no translation to the query document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported filter operator '{operator}' on '{field}'")]
pub struct UnsupportedOperatorError {
    /// The operator key as supplied, e.g. `$gte`.
    pub operator: String,
    /// The field the operator was applied to, or the option key when it was
    /// supplied at the top level of the options object.
    pub field: String,
}

/// Errors related to malformed filters or options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A known-tier filter names a field the entity does not declare.
    #[error("unknown field '{field}' for entity type '{entity_type}'")]
    UnknownField { entity_type: String, field: String },

    /// A filter value does not fit the field it targets.
    #[error("invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// An option does not have the expected shape.
    #[error("malformed option '{option}': {message}")]
    MalformedOption { option: String, message: String },
}

/// Result type for compile operations.
pub type SearchResult<T> = Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::UnknownEntity {
            entity_type: "channels".to_string(),
        };
        assert!(err.to_string().contains("channels"));
        assert!(err.to_string().contains("no search configuration"));
    }

    #[test]
    fn test_unsupported_operator_display() {
        let err = UnsupportedOperatorError {
            operator: "$gte".to_string(),
            field: "created_at".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported filter operator '$gte' on 'created_at'"
        );
    }

    #[test]
    fn test_search_error_from_conversions() {
        let err: SearchError = ValidationError::MalformedOption {
            option: "$in".to_string(),
            message: "expected [field, values]".to_string(),
        }
        .into();
        assert!(matches!(err, SearchError::Validation(_)));
        assert_eq!(err.status_code(), 400);

        let err: SearchError = ConfigurationError::UnknownEntity {
            entity_type: "x".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_retryable());
    }
}
