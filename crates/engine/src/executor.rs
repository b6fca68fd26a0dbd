// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use sb_adapters::{SessionConfig, TransportAdapter, TransportStatus};
use sb_core::{Clock, Effect, Event, SessionGeneration, TracedEffect};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("event channel closed")]
    ChannelClosed,
}

/// Executes effects using the configured transport
///
/// Start and end run as background tasks that report back through
/// `event_tx` as `*Resolved` events, so the engine loop keeps consuming
/// events while the transport is busy. Sends are awaited in place to keep
/// user messages in order.
pub struct Executor<T, C: Clock> {
    transport: T,
    clock: C,
    /// Channel shared with the transport for lifecycle events
    event_tx: mpsc::Sender<Event>,
}

impl<T, C> Executor<T, C>
where
    T: TransportAdapter,
    C: Clock,
{
    pub fn new(transport: T, clock: C, event_tx: mpsc::Sender<Event>) -> Self {
        Self {
            transport,
            clock,
            event_tx,
        }
    }

    /// Get a reference to the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transport_status(&self) -> TransportStatus {
        self.transport.status()
    }

    /// Execute a single effect with tracing
    ///
    /// Returns an optional event that should be fed back into the event loop.
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        let op_name = effect.name();
        let span = tracing::info_span!("effect", effect = op_name);

        async {
            tracing::info!(fields = ?effect.fields(), "executing");

            let start = std::time::Instant::now();
            let result = self.execute_inner(effect).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(event) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    has_event = event.is_some(),
                    "completed"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    /// Execute multiple effects in order
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<Vec<Event>, ExecuteError> {
        let mut result_events = Vec::new();
        for effect in effects {
            if let Some(event) = self.execute(effect).await? {
                result_events.push(event);
            }
        }
        Ok(result_events)
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        if self.event_tx.is_closed() {
            return Err(ExecuteError::ChannelClosed);
        }

        match effect {
            Effect::StartSession {
                generation,
                agent,
                user_id,
                mode,
            } => {
                let config = SessionConfig {
                    generation,
                    connection_handle: agent.handle,
                    user_id,
                    mode,
                };
                let transport = self.transport.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(
                    async move {
                        let error = transport
                            .start_session(config, event_tx.clone())
                            .await
                            .err()
                            .map(|e| e.to_string());
                        report(&event_tx, Event::StartResolved { generation, error }).await;
                    }
                    .in_current_span(),
                );
                Ok(None)
            }

            Effect::EndSession { generation } => {
                let transport = self.transport.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(
                    async move {
                        let error = transport.end_session().await.err().map(|e| e.to_string());
                        report(&event_tx, Event::EndResolved { generation, error }).await;
                    }
                    .in_current_span(),
                );
                Ok(None)
            }

            Effect::SendMessage { generation, text } => {
                match self.transport.send_message(&text).await {
                    Ok(()) => Ok(None),
                    Err(e) => Ok(Some(send_failed(generation, e.to_string()))),
                }
            }
        }
    }
}

fn send_failed(generation: SessionGeneration, detail: String) -> Event {
    Event::SendResolved {
        generation,
        error: Some(detail),
    }
}

async fn report(event_tx: &mpsc::Sender<Event>, event: Event) {
    let name = event.name();
    if event_tx.send(event).await.is_err() {
        tracing::warn!(event = name, "event channel closed, dropping resolution");
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
