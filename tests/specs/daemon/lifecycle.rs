//! Daemon start/stop lifecycle specs

use crate::prelude::*;
use sb_daemon::{Request, Response, PROTOCOL_VERSION};

#[test]
fn start_writes_state_files_and_answers_ping() {
    let daemon = Daemon::start();

    assert!(daemon.socket_path().exists());
    assert!(daemon.state_path().join("daemon.pid").exists());
    assert_eq!(
        std::fs::read_to_string(daemon.state_path().join("daemon.version")).unwrap(),
        PROTOCOL_VERSION
    );
    assert_eq!(daemon.request(&Request::Ping), Response::Pong);
    assert!(daemon.log().starts_with("--- sbd: starting (pid: "));
}

#[test]
fn second_instance_reports_running_daemon() {
    let daemon = Daemon::start();

    let output = daemon.command().output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sbd is already running"), "stderr: {stderr}");

    // The running daemon is unaffected
    assert_eq!(daemon.request(&Request::Ping), Response::Pong);
}

#[test]
fn shutdown_request_removes_state_files() {
    let mut daemon = Daemon::start();
    daemon.stop();

    assert!(!daemon.socket_path().exists());
    assert!(!daemon.state_path().join("daemon.pid").exists());
    assert!(!daemon.state_path().join("daemon.version").exists());
}

#[test]
#[serial_test::serial]
fn shutdown_ends_live_session() {
    let mut daemon = Daemon::start();
    assert_eq!(daemon.request(&Request::Start), Response::Ok);
    daemon.wait_active(1);

    daemon.stop();

    assert!(daemon.log().contains("ending session before shutdown"));
}

#[test]
fn invalid_config_fails_startup() {
    let state_dir = tempfile::tempdir().unwrap();
    std::fs::write(state_dir.path().join("config.toml"), "agents = []").unwrap();

    let output = std::process::Command::new(sbd_binary())
        .env("SB_STATE_DIR", state_dir.path())
        .env_remove("SB_CONFIG")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let log = std::fs::read_to_string(state_dir.path().join("daemon.log")).unwrap();
    assert!(log.contains("ERROR Failed to start daemon"), "log: {log}");
    assert!(!state_dir.path().join("daemon.sock").exists());
}
