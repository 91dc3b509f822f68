//! Shared setup for CLI commands.
//!
//! Resolves the configuration file and the artifact bundle from global flags,
//! builds the loader context, and discovers script files for `pack`.

use std::error::Error;
use std::path::{Path, PathBuf};

use hearth_config::{LoaderConfig, CONFIG_FILE};
use hearth_loader::LoaderContext;
use hearth_tables::{read_bundle, BuildArtifacts};
use tracing::debug;

use crate::GlobalArgs;

/// Loads the configuration.
///
/// `--config` names the file explicitly. Otherwise `hearth.toml` is looked up
/// from the current directory upwards; without one the defaults apply.
pub fn load_config(global: &GlobalArgs) -> Result<LoaderConfig, Box<dyn Error>> {
    if let Some(ref path) = global.config {
        return Ok(hearth_config::load_config_file(path)?);
    }
    match find_config_dir(&std::env::current_dir()?) {
        Some(dir) => Ok(hearth_config::load_config(&dir)?),
        None => Ok(LoaderConfig::default()),
    }
}

/// Walks up from `start` looking for the nearest directory containing
/// `hearth.toml`.
pub fn find_config_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolves the bundle path: `--bundle` first, then `loader.bundle`.
pub fn bundle_path(config: &LoaderConfig, global: &GlobalArgs) -> Result<PathBuf, Box<dyn Error>> {
    global
        .bundle
        .clone()
        .or_else(|| config.loader.bundle.clone())
        .ok_or_else(|| "no bundle given: pass --bundle or set loader.bundle in hearth.toml".into())
}

/// Reads the bundle the global flags and config point at.
pub fn load_artifacts(
    config: &LoaderConfig,
    global: &GlobalArgs,
) -> Result<BuildArtifacts, Box<dyn Error>> {
    let path = bundle_path(config, global)?;
    debug!(path = %path.display(), "reading bundle");
    Ok(read_bundle(&path)?)
}

/// Reads the bundle and builds a verified loader context from it.
pub fn load_loader(
    config: &LoaderConfig,
    global: &GlobalArgs,
) -> Result<LoaderContext, Box<dyn Error>> {
    let loader = LoaderContext::from_config(load_artifacts(config, global)?, config);
    loader.verify()?;
    Ok(loader)
}

/// Discovers `.js` files under `dir` (recursive), sorted by path, paired with
/// their module ids.
///
/// The id is the path relative to `dir` without the extension, with `/`
/// separators on every platform.
pub fn discover_scripts(dir: &Path) -> Result<Vec<(String, PathBuf)>, Box<dyn Error>> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files)?;
    files.sort();
    files
        .into_iter()
        .map(|path| Ok((module_id_for(dir, &path)?, path)))
        .collect()
}

/// Recursively collects `.js` files.
fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), Box<dyn Error>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "js") {
            files.push(path);
        }
    }
    Ok(())
}

fn module_id_for(root: &Path, path: &Path) -> Result<String, Box<dyn Error>> {
    let relative = path.strip_prefix(root)?.with_extension("");
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    parts
        .map(|parts| parts.join("/"))
        .ok_or_else(|| format!("non UTF-8 script path {}", path.display()).into())
}
