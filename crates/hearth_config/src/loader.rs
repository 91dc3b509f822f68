//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LoaderConfig;
use std::collections::HashSet;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "hearth.toml";

/// Loads and validates `<dir>/hearth.toml`.
pub fn load_config(dir: &Path) -> Result<LoaderConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
///
/// A relative `loader.bundle` path is resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<LoaderConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = load_config_from_str(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.loader.bundle = config.loader.bundle.take().map(|bundle| {
        if bundle.is_relative() {
            base.join(bundle)
        } else {
            bundle
        }
    });
    Ok(config)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LoaderConfig, ConfigError> {
    let config: LoaderConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that parameter names are non-empty and unique.
fn validate_config(config: &LoaderConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for param in &config.loader.parameters {
        if param.is_empty() {
            return Err(ConfigError::ValidationError(
                "loader.parameters contains an empty name".to_string(),
            ));
        }
        if !seen.insert(param.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate parameter '{param}'"
            )));
        }
    }
    Ok(())
}
