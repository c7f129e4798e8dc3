//! Logging setup: rotating log file plus warnings on stderr
//!
//! Writes logs to `~/.config/breathe/breathe.log` (or platform equivalent)
//! with 10 MB size-based rotation. Stdout belongs to the session display, so
//! the console layer writes to stderr and only shows warnings and errors.
//! Set `DEBUG_LOGGING=1` to enable debug output for breathe crates.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Filter directive for the file layer
fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,breathe=debug,breathe_cli=debug,breathe_core=debug"
    } else {
        "info"
    }
}

/// Directory for the log file and default voice clips
pub fn app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("breathe"))
}

/// Initialize logging with a file layer and a stderr warning layer.
///
/// Returns a `WorkerGuard` that must be held for the program lifetime so
/// buffered lines are flushed on exit. Falls back to stderr-only logging
/// (returning `None`) when the log file cannot be created.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = app_dir() else {
        init_stderr_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!(
            "Failed to create log directory {:?}: {}, logging to stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    // Keep breathe.log and breathe.log.1
    let log_path = log_dir.join("breathe.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(LOG_FILE_MAX_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(filter_directive(debug_logging)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "breathe logging initialized");

    Some(guard)
}

fn init_stderr_only(debug_logging: bool) {
    let level = if debug_logging {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(level);

    tracing_subscriber::registry().with(stderr_layer).init();

    tracing::debug!("breathe logging initialized (stderr only)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_directive_raises_breathe_crates_only() {
        assert_eq!(filter_directive(false), "info");
        let debug = filter_directive(true);
        assert!(debug.starts_with("info,"));
        assert!(debug.contains("breathe_core=debug"));
    }
}
