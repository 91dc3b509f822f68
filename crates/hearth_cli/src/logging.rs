//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Picks the default filter directive: `--verbose` and `--quiet` win over the
/// config file's `log.filter`.
pub fn filter_directive(verbose: bool, quiet: bool, configured: &str) -> String {
    if verbose {
        "hearth=debug".to_string()
    } else if quiet {
        "hearth=error".to_string()
    } else {
        configured.to_string()
    }
}

/// Installs the global subscriber once per process. `RUST_LOG` overrides
/// `default_directive`.
pub fn init_logging(default_directive: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    });
}
