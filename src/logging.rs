//! Tracing subscriber installation.
//!
//! Installed once at startup; `RUST_LOG` overrides the default `info` level.
//! The TUI writes to a log file through a non-blocking appender so the
//! alternate screen is not corrupted; one-shot commands log to stderr.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a stderr subscriber for one-shot commands.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Install a file subscriber for the TUI. The returned guard flushes the
/// writer on drop and must be held for the lifetime of the process.
pub fn init_file(path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    Ok(guard)
}
