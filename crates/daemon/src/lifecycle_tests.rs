// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_core::transcript::{SESSION_ENDED, SESSION_STARTED};
use tempfile::tempdir;

/// Process bus events until `done` holds or nothing arrives for a while.
async fn pump_until(
    daemon: &DaemonState,
    reader: &mut EventReader,
    done: impl Fn(&DaemonState) -> bool,
) {
    while !done(daemon) {
        match tokio::time::timeout(Duration::from_secs(2), reader.recv()).await {
            Ok(Some(event)) => daemon.process_event(event).await.unwrap(),
            _ => panic!("bus went quiet before condition held"),
        }
    }
}

fn transcript_texts(daemon: &DaemonState) -> Vec<String> {
    daemon
        .runtime
        .transcript_since(0)
        .into_iter()
        .map(|e| e.text)
        .collect()
}

#[test]
fn config_paths_live_under_state_dir() {
    let config = Config::for_state_dir(PathBuf::from("/tmp/sb"));
    assert_eq!(config.socket_path, PathBuf::from("/tmp/sb/daemon.sock"));
    assert_eq!(config.lock_path, PathBuf::from("/tmp/sb/daemon.pid"));
    assert_eq!(config.version_path, PathBuf::from("/tmp/sb/daemon.version"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/sb/daemon.log"));
    assert_eq!(config.config_path, PathBuf::from("/tmp/sb/config.toml"));
}

#[tokio::test]
async fn startup_writes_files_and_shutdown_removes_them() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().join("state"));

    let StartupResult { mut daemon, .. } = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    assert_eq!(
        std::fs::read_to_string(&config.lock_path).unwrap().trim(),
        std::process::id().to_string()
    );
    assert_eq!(
        std::fs::read_to_string(&config.version_path).unwrap(),
        PROTOCOL_VERSION
    );
    assert!(daemon.runtime.is_settled());
    assert_eq!(daemon.runtime.agents().len(), 6);

    daemon.shutdown().unwrap();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());

    std::fs::write(&config.socket_path, b"").unwrap();
    std::fs::write(&config.version_path, b"0.1.0").unwrap();

    // Simulate the running daemon holding the lock
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    let result = startup(&config).await;
    assert!(matches!(result, Err(LifecycleError::LockFailed(_))));

    assert!(config.socket_path.exists());
    assert!(config.version_path.exists());
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "12345");
}

#[tokio::test]
async fn invalid_settings_fail_startup_and_clean_up() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());
    std::fs::write(&config.config_path, "agents = []").unwrap();

    let result = startup(&config).await;
    assert!(matches!(
        result,
        Err(LifecycleError::Config(ConfigError::Registry(_)))
    ));
    assert!(!config.version_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn settings_file_shapes_the_runtime() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());
    std::fs::write(
        &config.config_path,
        "[[agents]]\nid = 7\nhandle = \"agent_seven\"\nname = \"Seven\"\n",
    )
    .unwrap();

    let StartupResult { daemon, .. } = startup(&config).await.unwrap();
    let agents = daemon.runtime.agents();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "Seven");
}

#[tokio::test]
async fn teardown_is_immediate_when_idle() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());
    let StartupResult {
        daemon,
        mut event_reader,
        ..
    } = startup(&config).await.unwrap();

    assert!(daemon.teardown(&mut event_reader, TEARDOWN_TIMEOUT).await);
    assert!(transcript_texts(&daemon).is_empty());
}

#[tokio::test]
async fn teardown_ends_live_session() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());
    let StartupResult {
        daemon,
        mut event_reader,
        ..
    } = startup(&config).await.unwrap();

    daemon.process_event(Event::StartRequested).await.unwrap();
    pump_until(&daemon, &mut event_reader, |d| {
        let view = d.runtime.view();
        view.state == SessionState::Active && !view.busy
    })
    .await;

    assert!(daemon.teardown(&mut event_reader, TEARDOWN_TIMEOUT).await);
    assert!(daemon.runtime.is_settled());
    assert_eq!(transcript_texts(&daemon), vec![SESSION_STARTED, SESSION_ENDED]);
}

#[tokio::test]
async fn teardown_waits_out_pending_start() {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_owned());
    let StartupResult {
        daemon,
        mut event_reader,
        ..
    } = startup(&config).await.unwrap();

    // Start still outstanding when shutdown begins
    daemon.process_event(Event::StartRequested).await.unwrap();
    assert!(daemon.runtime.view().busy);

    assert!(daemon.teardown(&mut event_reader, TEARDOWN_TIMEOUT).await);
    assert!(daemon.runtime.is_settled());
}
