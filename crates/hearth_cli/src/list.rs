//! `hearth list`: every built-in module with its digest and cache state.

use std::error::Error;
use std::fmt;

use hearth_config::LoaderConfig;
use hearth_loader::LoaderContext;

use crate::setup;
use crate::GlobalArgs;

/// What the bundle holds for a module's code cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No blob was built for the module.
    None,
    /// A blob built from the current source digest.
    Valid,
    /// A blob built from a different source digest.
    Skewed,
    /// A blob or source without its digest.
    Unpaired,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheState::None => "none",
            CacheState::Valid => "valid",
            CacheState::Skewed => "skewed",
            CacheState::Unpaired => "unpaired",
        })
    }
}

/// Classifies the code cache of `id`.
pub fn cache_state(loader: &LoaderContext, id: &str) -> CacheState {
    let Some(record) = loader.cache().lookup_cache(id) else {
        return CacheState::None;
    };
    match (record.producing_digest, loader.sources().source_digest(id)) {
        (Some(cached), Some(current)) if cached == current => CacheState::Valid,
        (Some(_), Some(_)) => CacheState::Skewed,
        _ => CacheState::Unpaired,
    }
}

/// Runs the `hearth list` command.
///
/// Does not verify the tables first, so broken pairings show up as
/// `unpaired` rather than aborting.
pub fn run(config: &LoaderConfig, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let loader = LoaderContext::from_config(setup::load_artifacts(config, global)?, config);

    let width = loader
        .sources()
        .ids()
        .map(|id| id.as_str().len())
        .max()
        .unwrap_or(2)
        .max(2);
    println!("{:<width$}  {:>8}  {:<32}  CACHE", "ID", "BYTES", "DIGEST");
    for (id, text) in loader.sources().sources() {
        let digest = loader
            .sources()
            .source_digest(id.as_str())
            .map_or("-", |d| d.as_str());
        println!(
            "{:<width$}  {:>8}  {:<32}  {}",
            id.as_str(),
            text.len(),
            digest,
            cache_state(&loader, id.as_str())
        );
    }
    if !global.quiet {
        eprintln!(
            "   {} modules, {} with code cache",
            loader.sources().len(),
            loader.cache().len()
        );
    }
    Ok(0)
}
