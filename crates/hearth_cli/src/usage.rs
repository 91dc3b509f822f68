//! `hearth usage`: compile everything and print the cache usage ledger.

use std::error::Error;

use hearth_config::LoaderConfig;
use hearth_engine::ScanEngine;
use hearth_loader::{ExecutionContext, UsageLedger};

use crate::check::compile_all;
use crate::setup;
use crate::{GlobalArgs, ReportFormat, UsageArgs};

/// Runs the `hearth usage` command.
pub fn run(
    args: &UsageArgs,
    config: &LoaderConfig,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn Error>> {
    let loader = setup::load_loader(config, global)?;
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let errors = compile_all(&loader, &mut cx)?;
    for e in &errors {
        eprintln!("warning: {e}");
    }

    match args.format {
        ReportFormat::Text => print!("{}", render_text(cx.ledger())),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(cx.ledger())?),
    }
    Ok(0)
}

/// Renders the ledger as two indented id lists.
pub fn render_text(ledger: &UsageLedger) -> String {
    let mut out = String::new();
    for (title, ids) in [
        ("compiled with cache", ledger.compiled_with_cache()),
        ("compiled without cache", ledger.compiled_without_cache()),
    ] {
        out.push_str(&format!("{title} ({}):\n", ids.len()));
        for id in ids {
            out.push_str(&format!("  {id}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_common::ModuleId;

    #[test]
    fn text_lists_both_sets() {
        let mut ledger = UsageLedger::new();
        ledger.record_with_cache(&ModuleId::new("internal/bootstrap/loaders"));
        ledger.record_without_cache(&ModuleId::new("fs"));
        assert_eq!(
            render_text(&ledger),
            "compiled with cache (1):\n  internal/bootstrap/loaders\n\
             compiled without cache (1):\n  fs\n"
        );
    }

    #[test]
    fn text_for_empty_ledger() {
        assert_eq!(
            render_text(&UsageLedger::new()),
            "compiled with cache (0):\ncompiled without cache (0):\n"
        );
    }
}
