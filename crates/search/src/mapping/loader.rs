//! Loads search declarations from JSON configuration.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "tasks": { "index": "tasks_v2", "esMapping": { "properties": { "title": { "type": "text" } } } } }
//! ```
//!
//! ```json
//! [ { "entity": "tasks", "esMapping": { "properties": { "title": { "type": "text" } } } } ]
//! ```
//!
//! Text input is deserialized straight into declarations, never through a
//! `serde_json::Value`, so repeated keys reach registration and are rejected
//! there instead of silently collapsing to the last one.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_json::error::Category;

use crate::error::ConfigurationError;

use super::SearchDeclaration;

/// A declaration carrying its entity type, as used by the array layout.
#[derive(Debug, Deserialize)]
struct NamedDeclaration {
    entity: String,
    #[serde(flatten)]
    declaration: SearchDeclaration,
}

/// Reads `(entity_type, declaration)` pairs from files or JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationLoader;

impl DeclarationLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Loads declarations from a JSON file.
    pub fn load_file(
        &self,
        path: &Path,
    ) -> Result<Vec<(String, SearchDeclaration)>, ConfigurationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::LoadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        parse_declarations(&content).map_err(|e| ConfigurationError::LoadFailed {
            path: path.display().to_string(),
            message: describe_parse_error(&e),
        })
    }

    /// Loads declarations from JSON text.
    pub fn load_str(
        &self,
        content: &str,
    ) -> Result<Vec<(String, SearchDeclaration)>, ConfigurationError> {
        parse_declarations(content).map_err(|e| ConfigurationError::InvalidDeclaration {
            entity_type: "<root>".to_string(),
            message: describe_parse_error(&e),
        })
    }

    /// Loads declarations from an already parsed JSON value.
    ///
    /// A `Value` has already merged repeated keys; prefer
    /// [`load_str`](Self::load_str) or [`load_file`](Self::load_file) for
    /// untrusted input.
    pub fn load_from_json(
        &self,
        json: &Value,
    ) -> Result<Vec<(String, SearchDeclaration)>, ConfigurationError> {
        match json {
            Value::Object(entries) => entries
                .iter()
                .map(|(entity_type, value)| {
                    let declaration = parse_declaration(entity_type, value)?;
                    Ok((entity_type.clone(), declaration))
                })
                .collect(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    let named: NamedDeclaration =
                        serde_json::from_value(item.clone()).map_err(|e| {
                            ConfigurationError::InvalidDeclaration {
                                entity_type: item
                                    .get("entity")
                                    .and_then(Value::as_str)
                                    .unwrap_or("<unnamed>")
                                    .to_string(),
                                message: e.to_string(),
                            }
                        })?;
                    Ok((named.entity, named.declaration))
                })
                .collect(),
            other => Err(ConfigurationError::InvalidDeclaration {
                entity_type: "<root>".to_string(),
                message: format!(
                    "expected an object or array of declarations, found {}",
                    json_type_name(other)
                ),
            }),
        }
    }
}

/// Declarations file contents in either layout, in document order.
struct DeclarationFile(Vec<(String, SearchDeclaration)>);

impl<'de> Deserialize<'de> for DeclarationFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FileVisitor;

        impl<'de> Visitor<'de> for FileVisitor {
            type Value = DeclarationFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object or array of search declarations")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut declarations = Vec::new();
                while let Some(entry) = access.next_entry::<String, SearchDeclaration>()? {
                    declarations.push(entry);
                }
                Ok(DeclarationFile(declarations))
            }

            fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut declarations = Vec::new();
                while let Some(named) = access.next_element::<NamedDeclaration>()? {
                    declarations.push((named.entity, named.declaration));
                }
                Ok(DeclarationFile(declarations))
            }
        }

        deserializer.deserialize_any(FileVisitor)
    }
}

fn parse_declarations(content: &str) -> serde_json::Result<Vec<(String, SearchDeclaration)>> {
    serde_json::from_str::<DeclarationFile>(content).map(|file| file.0)
}

fn describe_parse_error(error: &serde_json::Error) -> String {
    match error.classify() {
        Category::Data => format!("Invalid declaration: {}", error),
        Category::Io | Category::Syntax | Category::Eof => format!("Invalid JSON: {}", error),
    }
}

fn parse_declaration(entity_type: &str, value: &Value) -> Result<SearchDeclaration, ConfigurationError> {
    serde_json::from_value(value.clone()).map_err(|e| ConfigurationError::InvalidDeclaration {
        entity_type: entity_type.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
