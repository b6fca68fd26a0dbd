// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use sb_core::{AgentDescriptor, SessionView, TranscriptEntry};
use serde::{Deserialize, Serialize};

pub use sb_adapters::TransportStatus;

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

/// Request from a client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Inbound trigger from an external system. Only `newData` triggers
    /// are understood; `data` carries the switch payload.
    Trigger {
        event: String,
        #[serde(default)]
        data: serde_json::Value,
    },

    /// Start a session with the default agent
    Start,

    /// End the current session
    End,

    /// Send user text to the current session
    Send { text: String },

    /// Get the session snapshot
    Status,

    /// List the configured agents
    Agents,

    /// Transcript entries after the given sequence number
    Transcript {
        #[serde(default)]
        since: u64,
    },

    /// Request daemon shutdown
    Shutdown,
}

/// Response from daemon to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Ping response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Request accepted
    Ok,

    /// Request understood but not acted on
    Ignored { reason: String },

    /// Session snapshot plus the transport's own connection status
    Status {
        view: SessionView,
        transport: TransportStatus,
    },

    /// Configured agents, default first
    Agents { agents: Vec<AgentDescriptor> },

    /// Transcript entries, oldest first
    Transcript { entries: Vec<TranscriptEntry> },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
