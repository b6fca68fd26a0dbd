// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline transport for when no conversation backend is configured.

use super::{SessionConfig, TransportAdapter, TransportError, TransportStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use sb_core::{Event, SessionGeneration};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Transport that accepts everything and talks to no one.
///
/// Sessions connect immediately and disconnect when ended. Sent text is
/// dropped; no agent ever replies.
#[derive(Clone, Default)]
pub struct NoOpTransport {
    live: Arc<Mutex<Option<(SessionGeneration, mpsc::Sender<Event>)>>>,
}

impl NoOpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransportAdapter for NoOpTransport {
    async fn start_session(
        &self,
        config: SessionConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        *self.live.lock() = Some((config.generation, event_tx.clone()));
        let _ = event_tx
            .send(Event::TransportConnected {
                generation: config.generation,
            })
            .await;
        Ok(())
    }

    async fn end_session(&self) -> Result<(), TransportError> {
        let live = self.live.lock().take();
        if let Some((generation, event_tx)) = live {
            let _ = event_tx
                .send(Event::TransportDisconnected { generation })
                .await;
        }
        Ok(())
    }

    async fn send_message(&self, _text: &str) -> Result<(), TransportError> {
        if self.live.lock().is_none() {
            return Err(TransportError::NotConnected);
        }
        Ok(())
    }

    fn status(&self) -> TransportStatus {
        match *self.live.lock() {
            Some(_) => TransportStatus::Connected,
            None => TransportStatus::Disconnected,
        }
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
