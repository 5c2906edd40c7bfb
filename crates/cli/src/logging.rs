//! Logging setup.

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise both crates log at `level`. Output
/// goes to stderr so that stdout carries only the compiled JSON.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn default_directives(level: &str) -> String {
    let level = level.to_lowercase();
    format!("lookout_search={level},lookout_cli={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("DEBUG"),
            "lookout_search=debug,lookout_cli=debug"
        );
    }
}
