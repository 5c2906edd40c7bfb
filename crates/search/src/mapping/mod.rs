//! Per-entity search field mappings.
//!
//! Every searchable entity type ships a static [`SearchDeclaration`] in the
//! same shape the search backend's index mapping uses:
//!
//! ```json
//! {
//!   "index": "messages",
//!   "esMapping": {
//!     "properties": {
//!       "text": { "type": "text" },
//!       "channel_id": { "type": "keyword" },
//!       "has_files": { "type": "boolean" }
//!     }
//!   }
//! }
//! ```
//!
//! A declaration is validated once into an [`EntitySearchConfig`] and kept in
//! the [`EntityRegistry`], which the compiler queries by entity type.
//!
//! - [`registry`] - Entity type to configuration lookup
//! - [`loader`] - Reads declarations from JSON files

pub mod loader;
pub mod registry;

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::ConfigurationError;

pub use loader::DeclarationLoader;
pub use registry::EntityRegistry;

/// Kind of a searchable field, as declared by the mapping `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Analyzed full-text field; participates in `$text` search.
    Text,
    /// Exact-value field (identifiers, enums).
    Keyword,
    /// `true`/`false` field.
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Keyword => write!(f, "keyword"),
            FieldKind::Boolean => write!(f, "boolean"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldKind::Text),
            "keyword" => Ok(FieldKind::Keyword),
            "boolean" => Ok(FieldKind::Boolean),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

/// A single searchable field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    /// Field name in the indexed document.
    pub field_name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Whether the index stores edge prefixes, enabling prefix queries.
    pub prefix_enabled: bool,
}

impl FieldMapping {
    /// Creates a field mapping without prefix indexing.
    pub fn new(field_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field_name: field_name.into(),
            kind,
            prefix_enabled: false,
        }
    }

    /// Enables prefix matching for this field.
    pub fn with_prefixes(mut self) -> Self {
        self.prefix_enabled = true;
        self
    }

    /// Returns true for fields that take part in free-text search.
    pub fn is_text(&self) -> bool {
        self.kind == FieldKind::Text
    }
}

/// Validated, read-only search configuration of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySearchConfig {
    entity_type: String,
    index_name: String,
    /// Fields in declaration order.
    fields: Vec<FieldMapping>,
}

impl EntitySearchConfig {
    /// Builds a configuration from explicit field mappings.
    ///
    /// The index name falls back to the entity type when `index` is `None`.
    pub fn new(
        entity_type: impl Into<String>,
        index: Option<String>,
        fields: Vec<FieldMapping>,
    ) -> Result<Self, ConfigurationError> {
        let entity_type = entity_type.into();

        if entity_type.trim().is_empty() {
            return Err(ConfigurationError::InvalidDeclaration {
                entity_type,
                message: "entity type must not be empty".to_string(),
            });
        }

        for (i, field) in fields.iter().enumerate() {
            if field.field_name.is_empty() {
                return Err(ConfigurationError::InvalidDeclaration {
                    entity_type,
                    message: "field names must not be empty".to_string(),
                });
            }
            if fields[..i].iter().any(|f| f.field_name == field.field_name) {
                return Err(ConfigurationError::DuplicateField {
                    entity_type,
                    field: field.field_name.clone(),
                });
            }
            if field.prefix_enabled && field.kind != FieldKind::Text {
                return Err(ConfigurationError::InvalidDeclaration {
                    entity_type,
                    message: format!(
                        "index_prefixes is only allowed on text fields, '{}' is {}",
                        field.field_name, field.kind
                    ),
                });
            }
        }

        let index_name = match index {
            Some(index) if !index.trim().is_empty() => index,
            _ => entity_type.clone(),
        };

        Ok(Self {
            entity_type,
            index_name,
            fields,
        })
    }

    /// Validates a declaration into a configuration.
    pub fn from_declaration(
        entity_type: impl Into<String>,
        declaration: &SearchDeclaration,
    ) -> Result<Self, ConfigurationError> {
        let entity_type = entity_type.into();
        let mut fields = Vec::with_capacity(declaration.es_mapping.properties.len());

        for (name, property) in &declaration.es_mapping.properties {
            let kind = property.field_type.parse::<FieldKind>().map_err(|_| {
                ConfigurationError::UnsupportedFieldType {
                    entity_type: entity_type.clone(),
                    field: name.clone(),
                    field_type: property.field_type.clone(),
                }
            })?;
            fields.push(FieldMapping {
                field_name: name.clone(),
                kind,
                prefix_enabled: property.index_prefixes.is_some(),
            });
        }

        Self::new(entity_type, declaration.index.clone(), fields)
    }

    /// The entity type this configuration belongs to.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The index queries for this entity are sent to.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    /// Fields that take part in free-text search.
    pub fn text_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| f.is_text())
    }
}

/// Mapping entry for one property of a declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    /// Mapping type (`text`, `keyword`, `boolean`).
    #[serde(rename = "type")]
    pub field_type: String,

    /// Prefix indexing settings; presence alone enables prefix queries, so
    /// an explicit `null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub index_prefixes: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The `esMapping` section of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsMapping {
    /// Properties in declaration order; duplicates are kept so that
    /// validation can reject them.
    #[serde(default, with = "ordered_properties")]
    pub properties: Vec<(String, PropertyDeclaration)>,
}

/// Static search declaration of an entity type.
///
/// ```
/// use lookout_search::mapping::{EntitySearchConfig, SearchDeclaration};
///
/// let declaration = SearchDeclaration::new()
///     .index("applications")
///     .text_with_prefixes("name")
///     .keyword("company_id")
///     .boolean("published");
///
/// let config = EntitySearchConfig::from_declaration("applications", &declaration).unwrap();
/// assert_eq!(config.index_name(), "applications");
/// assert_eq!(config.text_fields().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDeclaration {
    /// Explicit index name; the entity type is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Field mapping.
    #[serde(rename = "esMapping", default)]
    pub es_mapping: EsMapping,
}

impl SearchDeclaration {
    /// Creates an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit index name.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Adds a property with an arbitrary mapping type.
    pub fn property(mut self, name: impl Into<String>, field_type: impl Into<String>) -> Self {
        self.es_mapping.properties.push((
            name.into(),
            PropertyDeclaration {
                field_type: field_type.into(),
                index_prefixes: None,
            },
        ));
        self
    }

    /// Adds a full-text field.
    pub fn text(self, name: impl Into<String>) -> Self {
        self.property(name, "text")
    }

    /// Adds a full-text field with prefix indexing.
    pub fn text_with_prefixes(mut self, name: impl Into<String>) -> Self {
        self.es_mapping.properties.push((
            name.into(),
            PropertyDeclaration {
                field_type: "text".to_string(),
                index_prefixes: Some(json!({ "min_chars": 1, "max_chars": 10 })),
            },
        ));
        self
    }

    /// Adds an exact-value field.
    pub fn keyword(self, name: impl Into<String>) -> Self {
        self.property(name, "keyword")
    }

    /// Adds a boolean field.
    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.property(name, "boolean")
    }
}

/// (De)serializes a JSON object as an ordered list of entries.
mod ordered_properties {
    use super::*;

    pub fn serialize<S>(
        properties: &[(String, PropertyDeclaration)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(properties.len()))?;
        for (name, property) in properties {
            map.serialize_entry(name, property)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, PropertyDeclaration)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Vec<(String, PropertyDeclaration)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to property mappings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut properties = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, property)) =
                    access.next_entry::<String, PropertyDeclaration>()?
                {
                    properties.push((name, property));
                }
                Ok(properties)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}
