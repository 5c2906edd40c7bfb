//! Searchable entities.
//!
//! An entity becomes searchable by implementing [`SearchableEntity`]: a static
//! entity-type identifier, a static [`SearchDeclaration`] and a projection of
//! an instance into the document stored in the search index. Registration
//! reads only the static parts, so no instance is ever needed to learn an
//! entity's mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::mapping::SearchDeclaration;

/// Capability of an entity kind to be indexed and searched.
pub trait SearchableEntity {
    /// Entity-type identifier used for registry lookups.
    const ENTITY_TYPE: &'static str;

    /// Static search declaration for this entity kind.
    fn search_declaration() -> SearchDeclaration;

    /// Projects this instance into its indexed document.
    fn search_document(&self) -> Value;
}

/// Attachment metadata of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFile {
    /// Display name of the file.
    pub name: String,
}

/// Denormalized location of a message, filled in when the message is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCache {
    /// Owning company.
    pub company_id: String,
    /// Owning workspace.
    pub workspace_id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: String,
    /// Author.
    pub user_id: String,
    /// Message body.
    pub text: String,
    /// Attached files.
    #[serde(default)]
    pub files: Vec<MessageFile>,
    /// Location identifiers, absent until the message is stored.
    #[serde(default)]
    pub cache: Option<MessageCache>,
}

impl SearchableEntity for Message {
    const ENTITY_TYPE: &'static str = "messages";

    fn search_declaration() -> SearchDeclaration {
        SearchDeclaration::new()
            .index("messages")
            .text("text")
            .keyword("user_id")
            .keyword("company_id")
            .keyword("workspace_id")
            .keyword("channel_id")
            .boolean("has_files")
    }

    /// File names are appended to the text so that attachments are found by
    /// name. Location identifiers are only indexed once the cache is filled.
    fn search_document(&self) -> Value {
        let file_names: Vec<&str> = self.files.iter().map(|f| f.name.as_str()).collect();
        let text = format!("{} {}", self.text, file_names.join(" "));

        let mut document = Map::new();
        if let Some(cache) = &self.cache {
            document.insert("company_id".to_string(), json!(cache.company_id));
            document.insert("workspace_id".to_string(), json!(cache.workspace_id));
            document.insert("channel_id".to_string(), json!(cache.channel_id));
            document.insert("user_id".to_string(), json!(self.user_id));
        }
        document.insert("text".to_string(), json!(text));
        document.insert("has_files".to_string(), json!(!self.files.is_empty()));

        Value::Object(document)
    }
}

/// Public identity of an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationIdentity {
    /// Display name.
    pub name: String,
    /// Marketplace description.
    #[serde(default)]
    pub description: String,
}

/// Marketplace publication state of an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPublication {
    /// Listed in the public marketplace.
    pub published: bool,
    /// Publication was requested by the developer.
    pub requested: bool,
}

/// A third-party application installable in a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier.
    pub id: String,
    /// Company that owns the application.
    pub company_id: String,
    /// Public identity.
    pub identity: ApplicationIdentity,
    /// Publication state.
    #[serde(default)]
    pub publication: ApplicationPublication,
}

impl SearchableEntity for Application {
    const ENTITY_TYPE: &'static str = "applications";

    fn search_declaration() -> SearchDeclaration {
        SearchDeclaration::new()
            .index("applications")
            .text_with_prefixes("name")
            .text("description")
            .keyword("company_id")
            .boolean("published")
    }

    fn search_document(&self) -> Value {
        json!({
            "name": self.identity.name,
            "description": self.identity.description,
            "company_id": self.company_id,
            "published": self.publication.published,
        })
    }
}
