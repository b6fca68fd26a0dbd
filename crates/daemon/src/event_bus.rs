// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for daemon communication.
//!
//! The listener and the transport both publish onto the bus; the engine
//! loop is the only reader, so events reach the session machine one at a
//! time in arrival order.

use sb_core::Event;
use thiserror::Error;
use tokio::sync::mpsc;

/// Bus capacity before `send` starts rejecting events
pub const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("event bus is full")]
    Full,
    #[error("event bus is closed")]
    Closed,
}

/// Sending half of the bus.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<Event>,
}

/// Reading half of the bus, owned by the engine loop.
pub struct EventReader {
    rx: mpsc::Receiver<Event>,
}

impl EventBus {
    pub fn new() -> (Self, EventReader) {
        Self::with_capacity(EVENT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, EventReader) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, EventReader { rx })
    }

    /// Enqueue an event without waiting.
    pub fn send(&self, event: Event) -> Result<(), EventBusError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EventBusError::Full,
            mpsc::error::TrySendError::Closed(_) => EventBusError::Closed,
        })
    }

    /// Raw sender handed to the runtime so transport callbacks land on the bus.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }
}

impl EventReader {
    /// Next event, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Next event if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
