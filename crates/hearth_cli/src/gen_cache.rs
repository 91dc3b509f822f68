//! `hearth gen-cache`: regenerate code caches from the current sources.
//!
//! Every module not excluded by `cache.exclude` is compiled eagerly and
//! serialized. The new bundle records the current source digest as each
//! blob's producing digest, so the runtime digest gate accepts it.

use std::error::Error;

use hearth_config::LoaderConfig;
use hearth_engine::ScanEngine;
use hearth_loader::{compile_as_module, CompileMode, ExecutionContext, LoaderContext};
use hearth_tables::{write_bundle, BuildArtifacts, IntegrityError};
use tracing::{debug, info};

use crate::setup;
use crate::{GenCacheArgs, GlobalArgs};

/// Version string recorded in bundles this tool writes.
pub const PRODUCER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Produces artifacts with fresh code caches for `sources`.
///
/// Existing caches in `sources` are discarded; excluded ids get none.
pub fn regenerate(
    mut sources: BuildArtifacts,
    config: &LoaderConfig,
) -> Result<BuildArtifacts, Box<dyn Error>> {
    sources.clear_code_cache();
    sources.check_consistency()?;

    let loader = LoaderContext::from_config(sources.clone(), config);
    let mut cx = ExecutionContext::new(ScanEngine::new());
    let mut out = sources;

    for id in loader.sources().ids() {
        if config.cache.exclude.iter().any(|e| e == id.as_str()) {
            debug!(module = %id, "excluded from code cache");
            continue;
        }
        let blob = compile_as_module(&loader, &mut cx, id.as_str(), CompileMode::CacheGeneration)?
            .into_code_cache()
            .ok_or_else(|| format!("no code cache produced for '{id}'"))?;
        let digest = loader
            .sources()
            .source_digest(id.as_str())
            .ok_or_else(|| IntegrityError::MissingSourceDigest(id.clone()))?
            .clone();
        out.add_code_cache(id.clone(), blob, digest);
    }
    info!(
        modules = out.sources.len(),
        caches = out.code_cache.len(),
        "code caches regenerated"
    );
    Ok(out)
}

/// Runs the `hearth gen-cache` command.
pub fn run(
    args: &GenCacheArgs,
    config: &LoaderConfig,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn Error>> {
    let artifacts = regenerate(setup::load_artifacts(config, global)?, config)?;
    write_bundle(&args.out, &artifacts, PRODUCER_VERSION)?;
    if !global.quiet {
        eprintln!(
            "   Wrote {} code caches for {} modules to {}",
            artifacts.code_cache.len(),
            artifacts.sources.len(),
            args.out.display()
        );
    }
    Ok(0)
}
