// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, teardown, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use sb_adapters::{NoOpTransport, TracedTransport};
use sb_core::{Event, SessionState, SystemClock};
use sb_engine::{Runtime, RuntimeConfig, RuntimeDeps};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::{ConfigError, Settings};
use crate::env;
use crate::event_bus::{EventBus, EventReader};
use crate::protocol::PROTOCOL_VERSION;

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = Runtime<TracedTransport<NoOpTransport>, SystemClock>;

/// How long shutdown waits for a live session to end
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/switchboard)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to optional settings file
    pub config_path: PathBuf,
}

impl Config {
    /// Resolve paths from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let mut config = Self::for_state_dir(env::state_dir()?);
        if let Some(path) = env::config_path() {
            config.config_path = path;
        }
        Ok(config)
    }

    pub fn for_state_dir(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            config_path: state_dir.join("config.toml"),
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Shared with the listener, which only reads from it
    pub runtime: Arc<DaemonRuntime>,
    pub event_bus: EventBus,
    pub start_time: Instant,
}

/// Result of daemon startup
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
    /// Event reader for the engine loop
    pub event_reader: EventReader,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl DaemonState {
    /// Apply one event and publish the events it produced.
    pub async fn process_event(&self, event: Event) -> Result<(), LifecycleError> {
        let result_events = self
            .runtime
            .handle_event(event)
            .await
            .map_err(|e| LifecycleError::Runtime(e.to_string()))?;

        for result_event in result_events {
            if let Err(e) = self.event_bus.send(result_event) {
                warn!("Failed to publish runtime result event: {}", e);
            }
        }
        Ok(())
    }

    /// End any live session before exit.
    ///
    /// Keeps feeding events to the machine until the slot is idle with
    /// nothing outstanding, or `timeout` elapses. Returns whether it settled.
    pub async fn teardown(&self, reader: &mut EventReader, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.runtime.is_settled() {
                return true;
            }

            let view = self.runtime.view();
            if !view.busy && view.state != SessionState::Idle {
                info!(state = %view.state, "ending session before shutdown");
                if let Err(e) = self.process_event(Event::EndRequested).await {
                    warn!("Failed to end session on shutdown: {}", e);
                    return false;
                }
                continue;
            }

            match tokio::time::timeout_at(deadline, reader.recv()).await {
                Ok(Some(Event::Shutdown)) => {}
                Ok(Some(event)) => {
                    if let Err(e) = self.process_event(event).await {
                        warn!("Error processing event during teardown: {}", e);
                    }
                }
                Ok(None) => return self.runtime.is_settled(),
                Err(_) => {
                    warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "session did not settle before shutdown"
                    );
                    return false;
                }
            }
        }
    }

    /// Remove the files that advertise a running daemon.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            remove_if_exists(path);
        }

        // Lock is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
        Ok(())
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), "Failed to remove file: {}", e);
        }
    }
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Files belong to the already-running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating so a running daemon's PID survives a failed lock
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::write(&config.version_path, PROTOCOL_VERSION)?;

    let settings = Settings::load(&config.config_path)?;
    let registry = settings.registry().map_err(ConfigError::from)?;
    info!(
        agents = registry.len(),
        default_agent = %registry.default_agent().id,
        switch_queue = ?settings.switch_queue,
        "loaded agent registry"
    );

    let (event_bus, event_reader) = EventBus::new();
    let runtime = Runtime::new(
        RuntimeDeps {
            transport: TracedTransport::new(NoOpTransport::new()),
        },
        SystemClock,
        RuntimeConfig {
            registry,
            machine: settings.machine_config(),
        },
        event_bus.sender(),
    );

    // Stale socket from a crashed daemon; we hold the lock so it is ours
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            runtime: Arc::new(runtime),
            event_bus,
            start_time: Instant::now(),
        },
        listener,
        event_reader,
    })
}

fn cleanup_on_failure(config: &Config) {
    remove_if_exists(&config.socket_path);
    remove_if_exists(&config.version_path);
    remove_if_exists(&config.lock_path);
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
