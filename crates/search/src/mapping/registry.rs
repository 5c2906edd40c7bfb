//! Entity search configuration registry.
//!
//! The registry maps entity-type identifiers to validated
//! [`EntitySearchConfig`]s. It is populated once at process start (from
//! built-in entities, [`SearchableEntity`] implementations or declaration
//! files) and then only read. Lookups hand out `Arc`s, so a registry wrapped in
//! an `Arc` can be shared by any number of request tasks without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Application, Message, SearchableEntity};
use crate::error::ConfigurationError;

use super::{EntitySearchConfig, SearchDeclaration};

/// In-memory registry of entity search configurations.
#[derive(Clone, Default)]
pub struct EntityRegistry {
    configs: HashMap<String, Arc<EntitySearchConfig>>,
}

impl EntityRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in entities (`messages`,
    /// `applications`).
    pub fn with_builtin_entities() -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        registry.register_entity::<Message>()?;
        registry.register_entity::<Application>()?;
        Ok(registry)
    }

    /// Returns the number of registered entity types.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Returns true if no entity type is registered.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Returns true if the entity type is registered.
    pub fn contains(&self, entity_type: &str) -> bool {
        self.configs.contains_key(entity_type)
    }

    /// Validates and registers a declaration under `entity_type`.
    pub fn register(
        &mut self,
        entity_type: impl Into<String>,
        declaration: &SearchDeclaration,
    ) -> Result<(), ConfigurationError> {
        let config = EntitySearchConfig::from_declaration(entity_type, declaration)?;
        self.register_config(config)
    }

    /// Registers the static declaration of a [`SearchableEntity`].
    pub fn register_entity<E: SearchableEntity>(&mut self) -> Result<(), ConfigurationError> {
        self.register(E::ENTITY_TYPE, &E::search_declaration())
    }

    /// Registers an already validated configuration.
    pub fn register_config(&mut self, config: EntitySearchConfig) -> Result<(), ConfigurationError> {
        if self.configs.contains_key(config.entity_type()) {
            return Err(ConfigurationError::DuplicateEntity {
                entity_type: config.entity_type().to_string(),
            });
        }

        tracing::debug!(
            entity_type = config.entity_type(),
            index = config.index_name(),
            fields = config.fields().len(),
            "Registered search configuration"
        );

        self.configs
            .insert(config.entity_type().to_string(), Arc::new(config));
        Ok(())
    }

    /// Registers every `(entity_type, declaration)` pair, stopping at the
    /// first invalid one. Returns the number registered.
    pub fn register_all<I>(&mut self, declarations: I) -> Result<usize, ConfigurationError>
    where
        I: IntoIterator<Item = (String, SearchDeclaration)>,
    {
        let mut count = 0;
        for (entity_type, declaration) in declarations {
            self.register(entity_type, &declaration)?;
            count += 1;
        }

        tracing::info!(
            registered = count,
            total = self.configs.len(),
            "Search declarations loaded"
        );

        Ok(count)
    }

    /// Looks up the configuration of an entity type.
    pub fn lookup(&self, entity_type: &str) -> Result<Arc<EntitySearchConfig>, ConfigurationError> {
        self.get(entity_type)
            .ok_or_else(|| ConfigurationError::UnknownEntity {
                entity_type: entity_type.to_string(),
            })
    }

    /// Returns the configuration of an entity type, if registered.
    pub fn get(&self, entity_type: &str) -> Option<Arc<EntitySearchConfig>> {
        self.configs.get(entity_type).cloned()
    }

    /// Removes an entity type from the registry.
    pub fn unregister(
        &mut self,
        entity_type: &str,
    ) -> Result<Arc<EntitySearchConfig>, ConfigurationError> {
        self.configs
            .remove(entity_type)
            .ok_or_else(|| ConfigurationError::UnknownEntity {
                entity_type: entity_type.to_string(),
            })
    }

    /// Returns all registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.configs.keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entity_types", &self.entity_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldKind;

    fn notes_declaration() -> SearchDeclaration {
        SearchDeclaration::new().text("body").keyword("author_id")
    }

    #[test]
    fn test_registry_operations() {
        let mut registry = EntityRegistry::new();
        assert!(registry.is_empty());

        registry.register("notes", &notes_declaration()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("notes"));

        let config = registry.lookup("notes").unwrap();
        assert_eq!(config.entity_type(), "notes");
        assert_eq!(config.field("author_id").unwrap().kind, FieldKind::Keyword);

        registry.unregister("notes").unwrap();
        assert!(registry.is_empty());
        assert!(registry.unregister("notes").is_err());
    }

    #[test]
    fn test_unknown_entity_lookup() {
        let registry = EntityRegistry::new();
        let err = registry.lookup("channels").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownEntity {
                entity_type: "channels".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_entity_error() {
        let mut registry = EntityRegistry::new();
        registry.register("notes", &notes_declaration()).unwrap();
        let result = registry.register("notes", &notes_declaration());
        assert!(matches!(
            result,
            Err(ConfigurationError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_invalid_declaration_not_registered() {
        let mut registry = EntityRegistry::new();
        let declaration = SearchDeclaration::new().property("at", "date");
        assert!(registry.register("events", &declaration).is_err());
        assert!(!registry.contains("events"));
    }

    #[test]
    fn test_builtin_entities() {
        let registry = EntityRegistry::with_builtin_entities().unwrap();
        assert_eq!(registry.entity_types(), vec!["applications", "messages"]);
        assert_eq!(registry.lookup("messages").unwrap().index_name(), "messages");
    }

    #[test]
    fn test_register_all_counts() {
        let mut registry = EntityRegistry::new();
        let count = registry
            .register_all(vec![
                ("notes".to_string(), notes_declaration()),
                ("tasks".to_string(), SearchDeclaration::new().text("title")),
            ])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(registry.entity_types(), vec!["notes", "tasks"]);
    }

    #[test]
    fn test_lookup_shares_config() {
        let mut registry = EntityRegistry::new();
        registry.register("notes", &notes_declaration()).unwrap();
        let a = registry.lookup("notes").unwrap();
        let b = registry.lookup("notes").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
