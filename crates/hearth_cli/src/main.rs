//! Hearth CLI: inspect and rebuild the built-in module bundle.
//!
//! `hearth list` shows every module and the state of its code cache,
//! `hearth check` compiles everything and reports syntax errors,
//! `hearth usage` prints which modules compiled with a cache,
//! `hearth gen-cache` regenerates the code caches, and `hearth pack` builds a
//! cache-less bundle from a directory of scripts.

#![warn(missing_docs)]

mod check;
mod gen_cache;
mod list;
mod logging;
mod pack;
mod setup;
mod usage;

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use hearth_loader::LoaderError;
use hearth_tables::IntegrityError;

/// Exit code for errors that mean the embedded artifacts cannot be trusted.
pub const FATAL_EXIT_CODE: i32 = 101;

/// Hearth: built-in module loader tooling.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about = "Hearth built-in module loader")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `hearth.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Artifact bundle to operate on, overriding `loader.bundle`.
    #[arg(long, global = true)]
    pub bundle: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every built-in module with its digest and cache state.
    List,
    /// Compile every module and report syntax errors.
    Check,
    /// Compile every module and print the cache usage ledger.
    Usage(UsageArgs),
    /// Regenerate code caches for every module and write a new bundle.
    GenCache(GenCacheArgs),
    /// Build a bundle without code caches from a directory of scripts.
    Pack(PackArgs),
}

/// Arguments for the `hearth usage` subcommand.
#[derive(Parser, Debug)]
pub struct UsageArgs {
    /// Output format for the ledger.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `hearth gen-cache` subcommand.
#[derive(Parser, Debug)]
pub struct GenCacheArgs {
    /// Path of the bundle to write.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Arguments for the `hearth pack` subcommand.
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Directory searched recursively for `.js` files.
    pub dir: PathBuf,

    /// Path of the bundle to write.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
    /// Optional bundle path overriding the config.
    pub bundle: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        bundle: cli.bundle,
    };

    let result = setup::load_config(&global).and_then(|config| {
        logging::init_logging(&logging::filter_directive(
            global.verbose,
            global.quiet,
            &config.log.filter,
        ));
        match cli.command {
            Command::List => list::run(&config, &global),
            Command::Check => check::run(&config, &global),
            Command::Usage(ref args) => usage::run(args, &config, &global),
            Command::GenCache(ref args) => gen_cache::run(args, &config, &global),
            Command::Pack(ref args) => pack::run(args, &global),
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(exit_code_for(e.as_ref()));
        }
    }
}

/// Maps an error to the process exit code: 101 for integrity failures,
/// 1 for everything else.
fn exit_code_for(err: &(dyn Error + 'static)) -> i32 {
    let fatal = err.downcast_ref::<LoaderError>().is_some_and(LoaderError::is_fatal)
        || err.downcast_ref::<IntegrityError>().is_some();
    if fatal {
        FATAL_EXIT_CODE
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hearth_common::ModuleId;

    #[test]
    fn parse_list() {
        let cli = Cli::parse_from(["hearth", "list"]);
        assert!(matches!(cli.command, Command::List));
        assert!(cli.bundle.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_usage_default_format() {
        let cli = Cli::parse_from(["hearth", "usage"]);
        match cli.command {
            Command::Usage(ref args) => assert_eq!(args.format, ReportFormat::Text),
            _ => panic!("expected Usage command"),
        }
    }

    #[test]
    fn parse_usage_json() {
        let cli = Cli::parse_from(["hearth", "usage", "--format", "json"]);
        match cli.command {
            Command::Usage(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Usage command"),
        }
    }

    #[test]
    fn parse_gen_cache() {
        let cli = Cli::parse_from(["hearth", "gen-cache", "--out", "build/new.bundle"]);
        match cli.command {
            Command::GenCache(ref args) => {
                assert_eq!(args.out, PathBuf::from("build/new.bundle"));
            }
            _ => panic!("expected GenCache command"),
        }
    }

    #[test]
    fn parse_pack() {
        let cli = Cli::parse_from(["hearth", "pack", "lib", "-o", "lib.bundle"]);
        match cli.command {
            Command::Pack(ref args) => {
                assert_eq!(args.dir, PathBuf::from("lib"));
                assert_eq!(args.out, PathBuf::from("lib.bundle"));
            }
            _ => panic!("expected Pack command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "hearth",
            "--quiet",
            "--bundle",
            "out/hearth.bundle",
            "--config",
            "/etc/hearth.toml",
            "check",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.bundle, Some(PathBuf::from("out/hearth.bundle")));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/hearth.toml")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_global_flag_after_subcommand() {
        let cli = Cli::parse_from(["hearth", "list", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn gen_cache_requires_out() {
        assert!(Cli::try_parse_from(["hearth", "gen-cache"]).is_err());
    }

    #[test]
    fn exit_codes() {
        let fatal: Box<dyn Error> = Box::new(LoaderError::from(IntegrityError::UnknownModule(
            ModuleId::new("x"),
        )));
        assert_eq!(exit_code_for(fatal.as_ref()), FATAL_EXIT_CODE);

        let integrity: Box<dyn Error> =
            Box::new(IntegrityError::MissingSourceDigest(ModuleId::new("x")));
        assert_eq!(exit_code_for(integrity.as_ref()), FATAL_EXIT_CODE);

        let other: Box<dyn Error> = "no bundle".into();
        assert_eq!(exit_code_for(other.as_ref()), 1);
    }
}
