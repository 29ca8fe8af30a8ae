//! Handles logging and progress bars for the CLI.

use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::style::ProgressStyle;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use super::LogArgs;

//================================================================================================
// Statics
//================================================================================================

/// A flag to indicate whether ANSI escape codes should be used.
pub static ANSI: AtomicBool = AtomicBool::new(true);

/// Targets whose events follow `-v`/`-q`; every other crate (notably `zip`)
/// is capped at `warn`.
const OWN_TARGETS: [&str; 3] = ["distmeta", "dist_meta", "config"];

//================================================================================================
// Modules
//================================================================================================

/// Contains ANSI escape codes for styling terminal output.
pub mod ansi {
    /// ANSI escape code for magenta text.
    pub const MAGENTA: &str = "\x1b[35m";
    /// ANSI escape code to reset terminal styling.
    pub const RESET: &str = "\x1b[0m";
}

//================================================================================================
// Macros
//================================================================================================

/// A macro to log a fatal error.
#[macro_export]
macro_rules! fatal {
    ($error:expr) => {{
        use $crate::cli::logging::{ANSI, ansi};
        let ansi = ANSI.load(std::sync::atomic::Ordering::SeqCst);
        tracing::error!(
            fatal = true,
            "{}FATAL{} {:#}",
            if ansi { ansi::MAGENTA } else { "" },
            if ansi { ansi::RESET } else { "" },
            $error
        );
    }};
}

//================================================================================================
// Functions
//================================================================================================

/// Initializes the global tracing subscriber.
///
/// Logs go to stderr: a compact human readable format with progress bars on
/// a terminal, JSON lines otherwise. Event targets are only shown from
/// `DEBUG` up. The returned guard flushes the non-blocking writer when
/// dropped.
pub fn init_global_subscriber(args: LogArgs) -> WorkerGuard {
    let log_level = get_log_level(args);

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(
        log_level,
        rust_log.as_deref().filter(|_| args.quiet == 0),
    );
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.min(LevelFilter::WARN).into())
        .parse_lossy(directives);

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let progress_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template("{span_child_prefix}{spinner:.cyan} {span_name} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let fmt = if std::io::stderr().is_terminal() {
        fmt::layer()
            .without_time()
            .with_writer(progress_layer.get_stderr_writer())
            .with_target(log_level >= LevelFilter::DEBUG)
            .with_span_events(fmt::format::FmtSpan::NONE)
            .compact()
            .boxed()
    } else {
        ANSI.store(false, Ordering::SeqCst);
        fmt::layer()
            .with_ansi(false)
            .json()
            .with_current_span(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt)
        .with(env_filter)
        .with(progress_layer)
        .init();

    guard
}

fn get_log_level(args: LogArgs) -> LevelFilter {
    match args.quiet {
        0 => (),
        1 => return LevelFilter::WARN,
        _ => return LevelFilter::ERROR,
    }

    if let Ok(rust_log) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if let Ok(level) = LevelFilter::from_str(&rust_log) {
            return level;
        }
    }

    match args.verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// The filter directives for `level`.
///
/// A `RUST_LOG` holding target directives (anything but a bare level) is
/// used verbatim. Otherwise `level` applies to this tool's own crates only.
fn filter_directives(level: LevelFilter, rust_log: Option<&str>) -> String {
    if let Some(custom) = rust_log
        .map(str::trim)
        .filter(|v| !v.is_empty() && LevelFilter::from_str(v).is_err())
    {
        return custom.to_owned();
    }

    let level = level.to_string().to_ascii_lowercase();
    OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
