//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for driving a real `sbd` process over its socket.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

use sb_core::{SessionState, SessionView};
use sb_daemon::protocol::{decode, encode, TransportStatus};
use sb_daemon::{Request, Response};

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

const IPC_TIMEOUT: Duration = Duration::from_millis(500);

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // target/debug/deps/specs-<hash> -> target/debug
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn sbd_binary() -> PathBuf {
    binary_path("sbd")
}

/// Run `sbd` with arguments to completion
pub fn sbd(args: &[&str]) -> RunAssert {
    let output = Command::new(sbd_binary())
        .args(args)
        .env("SB_STATE_DIR", std::env::temp_dir().join("sb-specs-unused"))
        .output()
        .expect("sbd should run");
    RunAssert { output }
}

/// Result of a binary run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn passes(self) -> Self {
        assert!(
            self.output.status.success(),
            "expected success, got {:?}\nstderr: {}",
            self.output.status.code(),
            self.stderr()
        );
        self
    }

    pub fn fails(self) -> Self {
        assert!(
            !self.output.status.success(),
            "expected failure\nstdout: {}",
            self.stdout()
        );
        self
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain {expected:?}\nstdout: {stdout}"
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain {expected:?}\nstderr: {stderr}"
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Daemon
// =============================================================================

/// A running `sbd` with an isolated state directory.
pub struct Daemon {
    state_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Daemon {
    /// Start a daemon and wait for READY.
    pub fn start() -> Self {
        Self::start_with_config(None)
    }

    /// Start a daemon with `config.toml` contents.
    pub fn start_with_config(config: Option<&str>) -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        if let Some(content) = config {
            std::fs::write(state_dir.path().join("config.toml"), content).unwrap();
        }
        let mut daemon = Self {
            state_dir,
            child: None,
        };
        let mut child = daemon.command().stdout(Stdio::piped()).spawn().unwrap();

        let stdout = child.stdout.take().unwrap();
        let mut line = String::new();
        BufReader::new(stdout).read_line(&mut line).unwrap();
        daemon.child = Some(child);
        assert_eq!(
            line.trim(),
            "READY",
            "daemon did not start\nlog: {}",
            daemon.log()
        );
        daemon
    }

    /// Command for another `sbd` against the same state directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(sbd_binary());
        cmd.env("SB_STATE_DIR", self.state_path())
            .env_remove("SB_CONFIG")
            .stderr(Stdio::piped());
        cmd
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_path().join("daemon.sock")
    }

    /// Read the daemon log file contents (for debugging test failures)
    pub fn log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("daemon.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// One request/response exchange over the socket.
    pub fn request(&self, request: &Request) -> Response {
        let mut stream = UnixStream::connect(self.socket_path()).unwrap();
        stream.set_read_timeout(Some(IPC_TIMEOUT)).unwrap();
        stream.set_write_timeout(Some(IPC_TIMEOUT)).unwrap();

        let payload = encode(request).unwrap();
        stream
            .write_all(&(payload.len() as u32).to_be_bytes())
            .unwrap();
        stream.write_all(&payload).unwrap();

        let mut len = [0u8; 4];
        stream.read_exact(&mut len).unwrap();
        let mut body = vec![0u8; u32::from_be_bytes(len) as usize];
        stream.read_exact(&mut body).unwrap();
        decode(&body).unwrap()
    }

    pub fn status(&self) -> SessionView {
        self.status_with_transport().0
    }

    pub fn status_with_transport(&self) -> (SessionView, TransportStatus) {
        match self.request(&Request::Status) {
            Response::Status { view, transport } => (view, transport),
            other => panic!("unexpected status response: {other:?}"),
        }
    }

    pub fn transcript(&self) -> Vec<String> {
        match self.request(&Request::Transcript { since: 0 }) {
            Response::Transcript { entries } => entries.into_iter().map(|e| e.text).collect(),
            other => panic!("unexpected transcript response: {other:?}"),
        }
    }

    /// Wait until the slot is Active on `agent_id` with nothing outstanding.
    pub fn wait_active(&self, agent_id: u32) {
        let ok = wait_for(SPEC_WAIT_MAX_MS, || {
            let view = self.status();
            view.state == SessionState::Active
                && !view.busy
                && view.agent.map(|a| a.id.get()) == Some(agent_id)
        });
        assert!(ok, "agent {agent_id} never became active\nlog: {}", self.log());
    }

    pub fn wait_idle(&self) {
        let ok = wait_for(SPEC_WAIT_MAX_MS, || {
            let view = self.status();
            view.state == SessionState::Idle && !view.busy
        });
        assert!(ok, "session never settled idle\nlog: {}", self.log());
    }

    /// Send Shutdown and wait for the process to exit.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            assert_eq!(self.request(&Request::Shutdown), Response::ShuttingDown);
            let exited = wait_for(SPEC_WAIT_MAX_MS * 3, || {
                matches!(child.try_wait(), Ok(Some(_)))
            });
            assert!(exited, "daemon did not exit\nlog: {}", self.log());
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
