// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon log file handling.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;

use crate::lifecycle::{Config, LifecycleError};

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- sbd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- sbd: starting (pid: ";

/// Rotate the log at startup once it grows past this
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated files kept beside the live log (`daemon.log.1` is newest)
pub const MAX_ROTATIONS: u32 = 3;

fn rotated(log_path: &Path, n: u32) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Shift `daemon.log` to `daemon.log.1` (and older rotations up by one)
/// when it exceeds [`MAX_LOG_SIZE`]. Best effort.
pub fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }

    for n in (1..MAX_ROTATIONS).rev() {
        let from = rotated(log_path, n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(log_path, n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(log_path, 1));
}

/// Append the startup marker so readers can find the current attempt.
pub fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    rotate_log_if_needed(&config.log_path);

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write a startup error synchronously; the non-blocking writer may not
/// flush before the process exits.
pub fn write_startup_error(config: &Config, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

/// Install the file subscriber. Keep the guard alive until exit.
pub fn setup_logging(config: &Config) -> Result<WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(
        dir,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
