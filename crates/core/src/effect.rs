// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the system needs to perform

use crate::agent::AgentDescriptor;
use crate::id::UserId;
use crate::session::{ConnectionMode, SessionGeneration};
use serde::{Deserialize, Serialize};

/// Transport calls requested by the session machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Open a transport session with an agent
    StartSession {
        generation: SessionGeneration,
        agent: AgentDescriptor,
        user_id: UserId,
        mode: ConnectionMode,
    },

    /// Tear down the transport session
    EndSession { generation: SessionGeneration },

    /// Forward user text to the live session
    SendMessage {
        generation: SessionGeneration,
        text: String,
    },
}

impl Effect {
    pub fn generation(&self) -> SessionGeneration {
        match self {
            Effect::StartSession { generation, .. }
            | Effect::EndSession { generation }
            | Effect::SendMessage { generation, .. } => *generation,
        }
    }
}

impl crate::traced::TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::StartSession { .. } => "start_session",
            Effect::EndSession { .. } => "end_session",
            Effect::SendMessage { .. } => "send_message",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::StartSession {
                generation,
                agent,
                user_id,
                mode,
            } => vec![
                ("generation", generation.to_string()),
                ("agent_id", agent.id.to_string()),
                ("agent_name", agent.name.clone()),
                ("user_id", user_id.to_string()),
                ("mode", mode.to_string()),
            ],
            Effect::EndSession { generation } => vec![("generation", generation.to_string())],
            Effect::SendMessage { generation, text } => vec![
                ("generation", generation.to_string()),
                ("text_len", text.len().to_string()),
            ],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
