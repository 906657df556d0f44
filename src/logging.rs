// Logging setup. The terminal is owned by the UI, so log output goes to a
// file in the user's cache directory instead of stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "canvas_tui=info,warn";
pub const LOG_FILE: &str = "canvas-tui.log";

/// Directory holding the log file: `<cache dir>/canvas-tui`, or the temp
/// directory when the platform has no cache directory.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("canvas-tui")
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init() -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {:?}", dir))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %dir.display(),
        "canvas-tui starting"
    );
    Ok(guard)
}
