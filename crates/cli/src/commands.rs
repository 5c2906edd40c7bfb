//! Subcommand implementations.
//!
//! Each command returns its output as a string; `main` prints it.

use anyhow::Context;
use lookout_search::{DeclarationLoader, EntityRegistry, QueryAssembler, normalize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::{CliConfig, Command};

/// Builds the registry described by the configuration.
pub fn build_registry(config: &CliConfig) -> anyhow::Result<EntityRegistry> {
    let mut registry = if config.builtin_entities {
        EntityRegistry::with_builtin_entities()?
    } else {
        EntityRegistry::new()
    };

    if let Some(path) = &config.mappings {
        let declarations = DeclarationLoader::new().load_file(path)?;
        let count = registry
            .register_all(declarations)
            .with_context(|| format!("Failed to register declarations from {}", path.display()))?;
        info!(path = %path.display(), count, "Loaded search declarations");
    }

    Ok(registry)
}

/// Runs the configured subcommand.
pub fn run(config: &CliConfig) -> anyhow::Result<String> {
    match &config.command {
        Command::Compile {
            entity,
            filters,
            options,
            count,
            pretty,
        } => {
            let registry = build_registry(config)?;
            let output = compile(&registry, entity, filters, options, *count)?;
            let rendered = if *pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            Ok(rendered)
        }
        Command::Normalize { term } => Ok(normalize(term)),
        Command::Entities => {
            let registry = build_registry(config)?;
            Ok(describe_entities(&registry).join("\n"))
        }
    }
}

/// Compiles a request given as JSON text.
///
/// Returns `{ index, body, options }`; with `count` the body is the count
/// request body.
pub fn compile(
    registry: &EntityRegistry,
    entity: &str,
    filters: &str,
    options: &str,
    count: bool,
) -> anyhow::Result<Value> {
    let filters: Value = serde_json::from_str(filters).context("Invalid --filters JSON")?;
    let options: Value = serde_json::from_str(options).context("Invalid --options JSON")?;

    let compiled = QueryAssembler::new(registry)
        .assemble_json(entity, &filters, &options)
        .with_context(|| format!("Failed to compile search for '{}'", entity))?;

    if count {
        debug!(entity, "Emitting count body");
        return Ok(json!({
            "index": compiled.index,
            "body": compiled.count_body(),
            "options": compiled.options,
        }));
    }

    Ok(serde_json::to_value(&compiled)?)
}

/// One line per entity type: name, index and `field:kind` pairs.
pub fn describe_entities(registry: &EntityRegistry) -> Vec<String> {
    registry
        .entity_types()
        .into_iter()
        .filter_map(|entity_type| registry.get(&entity_type))
        .map(|config| {
            let fields: Vec<String> = config
                .fields()
                .iter()
                .map(|f| {
                    if f.prefix_enabled {
                        format!("{}:{}+prefix", f.field_name, f.kind)
                    } else {
                        format!("{}:{}", f.field_name, f.kind)
                    }
                })
                .collect();
            format!(
                "{}\tindex={}\t{}",
                config.entity_type(),
                config.index_name(),
                fields.join(" ")
            )
        })
        .collect()
}
