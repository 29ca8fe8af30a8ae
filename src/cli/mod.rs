//! Argument parsing and dispatch for the distmeta CLI.

mod commands;
pub mod logging;

use std::path::PathBuf;

use clap::Parser;
pub use commands::run;
pub use logging::init_global_subscriber;

/// Inspect the metadata of installed Python distributions.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// A directory to search for installed distributions
    ///
    /// May be given more than once; directories are searched in order, and a
    /// distribution found in an earlier directory shadows any with the same
    /// name found later. If not specified, the `paths` configuration key is
    /// used instead (see `DIST_META_PATHS`).
    #[arg(short, long = "path", value_name = "DIR", global = true)]
    paths: Vec<PathBuf>,

    /// Logging options
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    command: commands::Commands,
}

/// Options controlling the verbosity of log output.
#[derive(Parser, Clone, Copy, Debug)]
#[command(next_help_heading = "Log Options")]
pub struct LogArgs {
    /// Set the level of verbosity
    ///
    /// This flag can be used multiple times to increase verbosity:
    /// 1. -v    for DEBUG level
    /// 2. -vv   for TRACE level
    ///
    /// If not specified, defaults to INFO level.
    ///
    /// Alternatively, set the `RUST_LOG` environment variable (e.g., `RUST_LOG=info`), which takes
    /// precedence over this flag.
    ///
    /// **Note**: This flag is silently ignored when `--quiet` is also set.
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity",
    )]
    verbosity: u8,

    /// Suppress verbosity (*takes precedent*)
    ///
    /// This flag can be used multiple times to decrease verbosity:
    /// 1. -q    for WARN level
    /// 2. -qq   for ERROR level
    ///
    /// This flag *overrides* any verbosity settings. It takes precedence over both the
    /// `--verbosity` flag and the `RUST_LOG` environment variable.
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
    )]
    quiet: u8,
}

impl Args {
    /// The directories to search, falling back to the configured ones.
    fn search_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            config::CONFIG.paths.clone()
        } else {
            self.paths.clone()
        }
    }
}
