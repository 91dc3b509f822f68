//! `hearth check`: compile every module the way the runtime would.

use std::error::Error;

use hearth_config::LoaderConfig;
use hearth_engine::ScanEngine;
use hearth_loader::{compile_as_module, CompileMode, ExecutionContext, LoaderContext, LoaderError};
use tracing::debug;

use crate::setup;
use crate::GlobalArgs;

/// Compiles every module in id order in `cx`.
///
/// Recoverable errors (syntax errors) are collected and returned; the first
/// fatal error aborts.
pub fn compile_all(
    loader: &LoaderContext,
    cx: &mut ExecutionContext<ScanEngine>,
) -> Result<Vec<LoaderError>, LoaderError> {
    let mut errors = Vec::new();
    for id in loader.sources().ids() {
        match compile_as_module(loader, cx, id.as_str(), CompileMode::Execute) {
            Ok(_) => debug!(module = %id, "ok"),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => errors.push(e),
        }
    }
    Ok(errors)
}

/// Runs the `hearth check` command.
///
/// Returns exit code 0 if every module compiled, 1 otherwise.
pub fn run(config: &LoaderConfig, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let loader = setup::load_loader(config, global)?;
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let errors = compile_all(&loader, &mut cx)?;
    for e in &errors {
        eprintln!("error: {e}");
    }

    if !global.quiet {
        eprintln!(
            "   Checked {} modules: {} with cache, {} without, {} errors",
            loader.sources().len(),
            cx.ledger().compiled_with_cache().len(),
            cx.ledger().compiled_without_cache().len(),
            errors.len()
        );
    }
    Ok(if errors.is_empty() { 0 } else { 1 })
}
