//! `hearth pack`: build a bundle without code caches from script files.

use std::error::Error;
use std::path::Path;

use hearth_tables::{write_bundle, BuildArtifacts};

use crate::gen_cache::PRODUCER_VERSION;
use crate::setup::discover_scripts;
use crate::{GlobalArgs, PackArgs};

/// Reads every `.js` file under `dir` into source artifacts, digesting each
/// text.
pub fn collect_sources(dir: &Path) -> Result<BuildArtifacts, Box<dyn Error>> {
    let mut artifacts = BuildArtifacts::new();
    for (id, path) in discover_scripts(dir)? {
        let text = std::fs::read_to_string(&path)?;
        artifacts.add_source_digested(id, text);
    }
    Ok(artifacts)
}

/// Runs the `hearth pack` command.
///
/// Returns exit code 1 without writing anything if `dir` has no scripts.
pub fn run(args: &PackArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let artifacts = collect_sources(&args.dir)?;
    if artifacts.sources.is_empty() {
        eprintln!("warning: no .js files found in {}", args.dir.display());
        return Ok(1);
    }
    write_bundle(&args.out, &artifacts, PRODUCER_VERSION)?;
    if !global.quiet {
        eprintln!(
            "   Packed {} modules into {}",
            artifacts.sources.len(),
            args.out.display()
        );
    }
    Ok(0)
}
