//! Parsing and validation of `hearth.toml` loader configuration.
//!
//! The configuration selects the artifact bundle, the parameter list module
//! wrappers are compiled with, the code cache policy, and the default log
//! filter. Every section is optional; [`LoaderConfig::default`] is what an
//! empty file yields.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
