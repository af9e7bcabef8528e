//! Logging setup.
//!
//! A full-screen `ratatui` TUI owns the terminal, so logs never go to
//! stdout while it's active: they're written to `${ZDX_HOME}/logs/zdx.log`
//! via `tracing-appender`'s non-blocking rolling writer. In one-shot/JSON
//! mode, where no alternate region is live, logs go to stderr via a plain
//! `fmt` layer so they don't pollute the stdout payload.

use std::fs;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use zdx_core::config::paths;

/// Guard that must stay alive for the lifetime of the process to flush
/// buffered log lines; dropping it early silently truncates the log file.
pub struct LoggingGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

pub fn init(log_level: &str, tui_mode: bool) -> Result<LoggingGuard> {
    let filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if tui_mode {
        let log_path = paths::log_path();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("zdx.log")),
        );
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(LoggingGuard(Some(guard)))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(LoggingGuard(None))
    }
}
