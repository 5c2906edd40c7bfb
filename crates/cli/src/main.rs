//! Lookout command-line front end.
//!
//! Loads search declarations, compiles a request and prints the compiled
//! Elasticsearch query. Nothing is sent to a search backend.

mod commands;
mod config;
mod logging;

use clap::Parser;
use tracing::debug;

use crate::config::CliConfig;
use crate::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    debug!(
        version = lookout_search::VERSION,
        mappings = ?config.mappings,
        builtin_entities = config.builtin_entities,
        "Starting lookout"
    );

    let output = commands::run(&config)?;
    println!("{}", output);

    Ok(())
}
