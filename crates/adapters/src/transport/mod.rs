// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation transport adapters
//!
//! A transport owns at most one live conversation with a remote agent. It
//! reports lifecycle and inbound messages through the `event_tx` channel it
//! was given at start, tagging every event with the session's generation.

mod noop;

pub use noop::NoOpTransport;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, TransportCall};

use async_trait::async_trait;
use sb_core::{ConnectionHandle, ConnectionMode, Event, SessionGeneration, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from transport operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("start failed: {0}")]
    StartFailed(String),
    #[error("end failed: {0}")]
    EndFailed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("no live session")]
    NotConnected,
}

/// Parameters for opening a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Tag for every event this session reports
    pub generation: SessionGeneration,
    /// Agent-specific connection identifier
    pub connection_handle: ConnectionHandle,
    pub user_id: UserId,
    pub mode: ConnectionMode,
}

/// Connection status as reported by the transport itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportStatus::Disconnected => "disconnected",
            TransportStatus::Connecting => "connecting",
            TransportStatus::Connected => "connected",
            TransportStatus::Disconnecting => "disconnecting",
        };
        write!(f, "{}", s)
    }
}

/// Adapter for a realtime conversation backend
#[async_trait]
pub trait TransportAdapter: Clone + Send + Sync + 'static {
    /// Open a conversation.
    ///
    /// Returns once the backend accepted the request. `connected`,
    /// `message`, `error` and `disconnected` events arrive later on
    /// `event_tx`.
    async fn start_session(
        &self,
        config: SessionConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<(), TransportError>;

    /// Close the live conversation.
    async fn end_session(&self) -> Result<(), TransportError>;

    /// Deliver user text to the live conversation.
    async fn send_message(&self, text: &str) -> Result<(), TransportError>;

    fn status(&self) -> TransportStatus;
}
