//! Command-line configuration.
//!
//! Global options may be given as flags or through the environment:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LOOKOUT_LOG_LEVEL` | warn | Log level |
//! | `LOOKOUT_MAPPINGS` | (none) | JSON file with additional search declarations |
//! | `LOOKOUT_BUILTIN_ENTITIES` | true | Register the built-in `messages` and `applications` entities |

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Configuration of the `lookout` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "lookout")]
#[command(about = "Compile entity search requests into Elasticsearch queries")]
#[command(version)]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LOOKOUT_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// JSON file with search declarations to register.
    #[arg(long, env = "LOOKOUT_MAPPINGS", global = true)]
    pub mappings: Option<PathBuf>,

    /// Register the built-in entities.
    #[arg(
        long,
        env = "LOOKOUT_BUILTIN_ENTITIES",
        default_value = "true",
        action = ArgAction::Set,
        global = true
    )]
    pub builtin_entities: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compile filters and options for an entity and print the result.
    Compile {
        /// Entity type, e.g. `messages`.
        entity: String,

        /// Filters as a JSON object.
        #[arg(long, default_value = "{}")]
        filters: String,

        /// Options as a JSON object (`$in`, `$text`, `$raw`, `limit`, `page_token`).
        #[arg(long, default_value = "{}")]
        options: String,

        /// Print the count request body instead of the search body.
        #[arg(long)]
        count: bool,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the normalized form of a search term.
    Normalize {
        /// Term to normalize.
        term: String,
    },

    /// List registered entity types and their searchable fields.
    Entities,
}

impl CliConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log level '{}', expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if let Some(path) = &self.mappings {
            if !path.is_file() {
                errors.push(format!("Mappings file not found: {}", path.display()));
            }
        }

        if !self.builtin_entities && self.mappings.is_none() {
            errors.push(
                "No entities to search: built-in entities are disabled and no mappings file is set"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
