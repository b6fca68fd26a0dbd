// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SessionConfig, TransportAdapter, TransportError, TransportStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use sb_core::{ConnectionHandle, Event, SessionGeneration, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Recorded call to FakeTransport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Start {
        generation: SessionGeneration,
        handle: ConnectionHandle,
        user_id: UserId,
    },
    End,
    Send {
        text: String,
    },
}

/// Fake transport for testing
///
/// Records all calls, can fail the next call of each kind, and emits
/// `connected`/`disconnected` on its own unless told not to.
#[derive(Clone)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeTransportState>>,
}

struct FakeTransportState {
    calls: Vec<TransportCall>,
    /// Sessions started and not yet ended, oldest first
    live: Vec<(SessionGeneration, mpsc::Sender<Event>)>,
    /// Channel of the most recent session, kept after it ends
    last_tx: Option<(SessionGeneration, mpsc::Sender<Event>)>,
    peak_live: usize,
    ops_in_progress: usize,
    peak_ops: usize,
    status: TransportStatus,
    auto_lifecycle: bool,
    start_delay: Option<Duration>,
    end_delay: Option<Duration>,
    start_error: Option<TransportError>,
    end_error: Option<TransportError>,
    send_error: Option<TransportError>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTransportState {
                calls: Vec::new(),
                live: Vec::new(),
                last_tx: None,
                peak_live: 0,
                ops_in_progress: 0,
                peak_ops: 0,
                status: TransportStatus::Disconnected,
                auto_lifecycle: true,
                start_delay: None,
                end_delay: None,
                start_error: None,
                end_error: None,
                send_error: None,
            })),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Generations of the sessions started so far, in call order
    pub fn started(&self) -> Vec<SessionGeneration> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Start { generation, .. } => Some(*generation),
                _ => None,
            })
            .collect()
    }

    /// Generations currently live
    pub fn live_sessions(&self) -> Vec<SessionGeneration> {
        self.inner.lock().live.iter().map(|(g, _)| *g).collect()
    }

    /// Most sessions ever live at the same time
    pub fn peak_live(&self) -> usize {
        self.inner.lock().peak_live
    }

    /// Most start/end calls ever in progress at the same time
    pub fn peak_concurrent_ops(&self) -> usize {
        self.inner.lock().peak_ops
    }

    /// Stop emitting `connected`/`disconnected` automatically
    pub fn set_auto_lifecycle(&self, enabled: bool) {
        self.inner.lock().auto_lifecycle = enabled;
    }

    /// Delay every start before it completes
    pub fn set_start_delay(&self, delay: Duration) {
        self.inner.lock().start_delay = Some(delay);
    }

    /// Delay every end before it completes
    pub fn set_end_delay(&self, delay: Duration) {
        self.inner.lock().end_delay = Some(delay);
    }

    /// Set error to return on next start
    pub fn set_start_error(&self, error: TransportError) {
        self.inner.lock().start_error = Some(error);
    }

    /// Set error to return on next end
    pub fn set_end_error(&self, error: TransportError) {
        self.inner.lock().end_error = Some(error);
    }

    /// Set error to return on next send
    pub fn set_send_error(&self, error: TransportError) {
        self.inner.lock().send_error = Some(error);
    }

    /// Emit an agent message on the live session
    pub async fn emit_message(&self, text: &str) -> bool {
        let live = self.current();
        match live {
            Some((generation, tx)) => tx
                .send(Event::TransportMessage {
                    generation,
                    text: text.to_string(),
                })
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Emit a transport error on the live session
    pub async fn emit_error(&self, detail: &str) -> bool {
        let live = self.current();
        match live {
            Some((generation, tx)) => tx
                .send(Event::TransportError {
                    generation,
                    detail: detail.to_string(),
                })
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Drop the live session from the remote side
    pub async fn emit_disconnected(&self) -> bool {
        let live = {
            let mut inner = self.inner.lock();
            let live = inner.live.pop();
            if inner.live.is_empty() {
                inner.status = TransportStatus::Disconnected;
            }
            live
        };
        match live {
            Some((generation, tx)) => tx
                .send(Event::TransportDisconnected { generation })
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Send an arbitrary event on the most recent session's channel,
    /// even if that session already ended
    pub async fn inject(&self, event: Event) -> bool {
        let tx = self.inner.lock().last_tx.as_ref().map(|(_, tx)| tx.clone());
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    fn current(&self) -> Option<(SessionGeneration, mpsc::Sender<Event>)> {
        self.inner.lock().live.last().cloned()
    }

    fn begin_op(&self) {
        let mut inner = self.inner.lock();
        inner.ops_in_progress += 1;
        inner.peak_ops = inner.peak_ops.max(inner.ops_in_progress);
    }

    fn finish_op(&self) {
        let mut inner = self.inner.lock();
        inner.ops_in_progress = inner.ops_in_progress.saturating_sub(1);
    }
}

#[async_trait]
impl TransportAdapter for FakeTransport {
    async fn start_session(
        &self,
        config: SessionConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.calls.push(TransportCall::Start {
                generation: config.generation,
                handle: config.connection_handle.clone(),
                user_id: config.user_id.clone(),
            });
            inner.status = TransportStatus::Connecting;
            inner.start_delay
        };
        self.begin_op();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let auto = {
            let mut inner = self.inner.lock();
            if let Some(error) = inner.start_error.take() {
                inner.status = if inner.live.is_empty() {
                    TransportStatus::Disconnected
                } else {
                    TransportStatus::Connected
                };
                inner.ops_in_progress = inner.ops_in_progress.saturating_sub(1);
                return Err(error);
            }
            inner.live.push((config.generation, event_tx.clone()));
            inner.peak_live = inner.peak_live.max(inner.live.len());
            inner.last_tx = Some((config.generation, event_tx.clone()));
            inner.status = TransportStatus::Connected;
            inner.auto_lifecycle
        };
        if auto {
            let _ = event_tx
                .send(Event::TransportConnected {
                    generation: config.generation,
                })
                .await;
        }
        self.finish_op();
        Ok(())
    }

    async fn end_session(&self) -> Result<(), TransportError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.calls.push(TransportCall::End);
            if !inner.live.is_empty() {
                inner.status = TransportStatus::Disconnecting;
            }
            inner.end_delay
        };
        self.begin_op();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (ended, auto, result) = {
            let mut inner = self.inner.lock();
            // The session is gone whether or not the backend acknowledged it
            let ended = inner.live.pop();
            inner.status = if inner.live.is_empty() {
                TransportStatus::Disconnected
            } else {
                TransportStatus::Connected
            };
            let result = match inner.end_error.take() {
                Some(error) => Err(error),
                None => Ok(()),
            };
            (ended, inner.auto_lifecycle, result)
        };
        if let (Some((generation, tx)), true, Ok(())) = (ended, auto, &result) {
            let _ = tx.send(Event::TransportDisconnected { generation }).await;
        }
        self.finish_op();
        result
    }

    async fn send_message(&self, text: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TransportCall::Send {
            text: text.to_string(),
        });
        if let Some(error) = inner.send_error.take() {
            return Err(error);
        }
        if inner.live.is_empty() {
            return Err(TransportError::NotConnected);
        }
        Ok(())
    }

    fn status(&self) -> TransportStatus {
        self.inner.lock().status
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
