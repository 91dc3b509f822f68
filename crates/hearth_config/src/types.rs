//! Configuration types deserialized from `hearth.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// Parameter names module wrappers are compiled with when the configuration
/// does not override them.
pub const DEFAULT_PARAMETERS: [&str; 5] =
    ["exports", "require", "module", "process", "internalBinding"];

/// Log filter used when neither the environment nor the CLI supplies one.
pub const DEFAULT_LOG_FILTER: &str = "hearth=info";

/// The top-level loader configuration parsed from `hearth.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Bundle location and module wrapper settings.
    #[serde(default)]
    pub loader: LoaderSection,
    /// Code cache policy.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging defaults.
    #[serde(default)]
    pub log: LogConfig,
}

/// The `[loader]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderSection {
    /// Path of the artifact bundle to load, relative to the config file.
    #[serde(default)]
    pub bundle: Option<PathBuf>,
    /// Free parameter names every module body is compiled with.
    #[serde(default = "default_parameters")]
    pub parameters: Vec<String>,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            bundle: None,
            parameters: default_parameters(),
        }
    }
}

/// The `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Process-wide switch for consuming embedded code caches.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Treat a cache built from a different source digest as a fatal error
    /// instead of compiling from source.
    #[serde(default)]
    pub strict_digests: bool,
    /// Module ids that cache generation never produces a blob for.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_digests: false,
            exclude: Vec::new(),
        }
    }
}

/// The `[log]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing` env-filter directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_parameters() -> Vec<String> {
    DEFAULT_PARAMETERS.iter().map(|p| p.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
