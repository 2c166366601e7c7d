//! Tracing setup for the two binaries.
//!
//! Console output goes to stderr so it does not fight with the progress bar;
//! the image describer additionally writes every `info` event to a per-session
//! log file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn console_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs console + file logging. The returned guard must be kept alive
/// until the session ends; dropping it flushes the file writer.
///
/// Returns `None` for the guard when a global subscriber was already set
/// (the file layer is then not installed).
pub fn init_session_logging(log_file: &Path) -> Option<WorkerGuard> {
    let dir = log_file.parent().unwrap_or(Path::new("."));
    let name = log_file.file_name().unwrap_or_default();
    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter("warn"));

    let file = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .with_filter(LevelFilter::INFO);

    match tracing_subscriber::registry().with(console).with(file).try_init() {
        Ok(()) => Some(guard),
        Err(e) => {
            tracing::debug!("Logging already initialised: {}", e);
            None
        }
    }
}

/// Installs console-only logging at `info` unless `RUST_LOG` says otherwise.
pub fn init_console_logging() {
    let subscriber = fmt()
        .with_env_filter(console_filter("info"))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    if let Err(e) = subscriber.try_init() {
        tracing::debug!("Logging already initialised: {}", e);
    }
}
