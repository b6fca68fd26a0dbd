// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switchboard Daemon (sbd)
//!
//! Background process that owns the single agent session.
//!
//! Architecture:
//! - Listener Task: Spawned task handling socket I/O, emits events to EventBus
//! - Engine Loop: Main task processing events sequentially

use std::sync::Arc;

use sb_core::Event;
use sb_daemon::lifecycle::{self, TEARDOWN_TIMEOUT};
use sb_daemon::logging::{setup_logging, write_startup_error, write_startup_marker};
use sb_daemon::{Config, LifecycleError, ListenCtx, Listener, StartupResult, PROTOCOL_VERSION};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("sbd {PROTOCOL_VERSION}");
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("sbd {PROTOCOL_VERSION}");
                println!("Switchboard Daemon - hosts one agent session and switches it on request");
                println!();
                println!("USAGE:");
                println!("    sbd");
                println!();
                println!("Listens on a Unix socket under the state directory");
                println!("(SB_STATE_DIR, or $XDG_STATE_HOME/switchboard).");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: sbd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Before tracing setup, so readers can find this attempt
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting daemon");

    let StartupResult {
        mut daemon,
        listener: unix_listener,
        mut event_reader,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            let version = std::fs::read_to_string(&config.version_path)
                .unwrap_or_default()
                .trim()
                .to_string();

            eprintln!("sbd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            if !version.is_empty() {
                if version == PROTOCOL_VERSION {
                    eprintln!("  version: {version}");
                } else {
                    eprintln!("  version: {version} (outdated, current: {PROTOCOL_VERSION})");
                }
            }
            std::process::exit(1);
        }
        Err(e) => {
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let shutdown_notify = Arc::new(Notify::new());

    let listener = Listener::new(
        unix_listener,
        ListenCtx {
            event_bus: daemon.event_bus.clone(),
            runtime: Arc::clone(&daemon.runtime),
            start_time: daemon.start_time,
            shutdown: Arc::clone(&shutdown_notify),
        },
    );
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for a parent process waiting on startup
    println!("READY");

    // Engine loop: one event at a time
    loop {
        tokio::select! {
            event = event_reader.recv() => {
                match event {
                    Some(Event::Shutdown) => {
                        info!("Shutdown event received");
                        break;
                    }
                    Some(event) => {
                        let name = event.name();
                        if let Err(e) = daemon.process_event(event).await {
                            error!(event = name, "Error processing event: {}", e);
                        }
                    }
                    None => {
                        info!("Event bus closed, shutting down...");
                        break;
                    }
                }
            }

            _ = shutdown_notify.notified() => {
                info!("Shutdown requested via command");
                break;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    if !daemon.teardown(&mut event_reader, TEARDOWN_TIMEOUT).await {
        error!("Session still open at exit");
    }
    daemon.shutdown()?;
    info!("Daemon stopped");
    Ok(())
}
