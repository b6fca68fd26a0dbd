// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::transport::{SessionConfig, TransportAdapter, TransportError, TransportStatus};
use async_trait::async_trait;
use sb_core::Event;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wrapper that adds tracing to any TransportAdapter
#[derive(Clone)]
pub struct TracedTransport<T> {
    inner: T,
}

impl<T> TracedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: TransportAdapter> TransportAdapter for TracedTransport<T> {
    async fn start_session(
        &self,
        config: SessionConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        let span = tracing::info_span!(
            "transport.start",
            generation = %config.generation,
            handle = config.connection_handle.as_str(),
            user_id = config.user_id.as_str(),
            mode = %config.mode,
        );
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.start_session(config, event_tx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "session started"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "start failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn end_session(&self) -> Result<(), TransportError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.end_session().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "session ended"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "end failed"),
            }
            result
        }
        .instrument(tracing::info_span!("transport.end"))
        .await
    }

    async fn send_message(&self, text: &str) -> Result<(), TransportError> {
        tracing::info_span!("transport.send")
            .in_scope(|| tracing::debug!(text_len = text.len(), "sending"));
        let result = self.inner.send_message(text).await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "send failed");
        }
        result
    }

    fn status(&self) -> TransportStatus {
        let status = self.inner.status();
        tracing::trace!(%status, "status checked");
        status
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
