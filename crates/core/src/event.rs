// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the Switchboard system

use crate::session::SessionGeneration;
use crate::switch::SwitchCommand;
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions in the session machine.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- user surface --
    /// Start a session with the default agent
    #[serde(rename = "session:start")]
    StartRequested,

    #[serde(rename = "session:end")]
    EndRequested,

    #[serde(rename = "session:send")]
    SendRequested { text: String },

    // -- switch trigger --
    #[serde(rename = "switch:requested")]
    SwitchRequested { command: SwitchCommand },

    // -- outcomes of transport calls --
    #[serde(rename = "start:resolved")]
    StartResolved {
        generation: SessionGeneration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "end:resolved")]
    EndResolved {
        generation: SessionGeneration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "send:resolved")]
    SendResolved {
        generation: SessionGeneration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    // -- transport callbacks --
    #[serde(rename = "transport:connected")]
    TransportConnected { generation: SessionGeneration },

    #[serde(rename = "transport:disconnected")]
    TransportDisconnected { generation: SessionGeneration },

    #[serde(rename = "transport:message")]
    TransportMessage {
        generation: SessionGeneration,
        text: String,
    },

    #[serde(rename = "transport:error")]
    TransportError {
        generation: SessionGeneration,
        detail: String,
    },

    // -- system --
    #[serde(rename = "system:shutdown")]
    Shutdown,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StartRequested => "session:start",
            Event::EndRequested => "session:end",
            Event::SendRequested { .. } => "session:send",
            Event::SwitchRequested { .. } => "switch:requested",
            Event::StartResolved { .. } => "start:resolved",
            Event::EndResolved { .. } => "end:resolved",
            Event::SendResolved { .. } => "send:resolved",
            Event::TransportConnected { .. } => "transport:connected",
            Event::TransportDisconnected { .. } => "transport:disconnected",
            Event::TransportMessage { .. } => "transport:message",
            Event::TransportError { .. } => "transport:error",
            Event::Shutdown => "system:shutdown",
        }
    }

    /// One-line summary for logs. Message bodies are reduced to their length.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::StartRequested | Event::EndRequested | Event::Shutdown => t.to_string(),
            Event::SendRequested { text } => format!("{t} len={}", text.len()),
            Event::SwitchRequested { command } => {
                format!("{t} target={} now={}", command.target, command.switch_now)
            }
            Event::StartResolved { generation, error }
            | Event::EndResolved { generation, error }
            | Event::SendResolved { generation, error } => match error {
                Some(e) => format!("{t} gen={generation} error={e}"),
                None => format!("{t} gen={generation} ok"),
            },
            Event::TransportConnected { generation }
            | Event::TransportDisconnected { generation } => format!("{t} gen={generation}"),
            Event::TransportMessage { generation, text } => {
                format!("{t} gen={generation} len={}", text.len())
            }
            Event::TransportError { generation, detail } => {
                format!("{t} gen={generation} detail={detail}")
            }
        }
    }

    /// Generation the event refers to, for transport-originated events.
    pub fn generation(&self) -> Option<SessionGeneration> {
        match self {
            Event::StartResolved { generation, .. }
            | Event::EndResolved { generation, .. }
            | Event::SendResolved { generation, .. }
            | Event::TransportConnected { generation }
            | Event::TransportDisconnected { generation }
            | Event::TransportMessage { generation, .. }
            | Event::TransportError { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
