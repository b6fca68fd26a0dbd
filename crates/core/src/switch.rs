// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switch commands delivered by the external trigger channel.
//!
//! The trigger sends `newData` events whose payload looks like
//! `{"isend": "true", "id": "3"}`. Both fields arrive as text and are
//! parsed defensively: anything that is not a plain non-negative integer
//! id is rejected rather than guessed at.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name of the trigger event that carries switch commands.
pub const NEW_DATA_EVENT: &str = "newData";

/// Why a trigger payload could not be turned into a switch command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchParseError {
    #[error("payload has no agent id")]
    MissingId,
    #[error("agent id is not numeric: {0:?}")]
    NotNumeric(String),
    #[error("agent id out of range: {0}")]
    OutOfRange(String),
}

/// "Switch to agent X", consumed once by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCommand {
    pub target: AgentId,
    /// Only commands with this set cause a switch; others are inert.
    pub switch_now: bool,
}

impl SwitchCommand {
    pub fn now(target: AgentId) -> Self {
        Self {
            target,
            switch_now: true,
        }
    }

    /// Parse a `newData` payload.
    ///
    /// `isend` must be exactly the string `"true"` for the command to take
    /// effect. `id` may be a string-encoded integer or a JSON integer.
    pub fn from_payload(data: &Value) -> Result<Self, SwitchParseError> {
        let switch_now = matches!(data.get("isend"), Some(Value::String(s)) if s == "true");
        let target = parse_agent_id(data.get("id").ok_or(SwitchParseError::MissingId)?)?;
        Ok(Self { target, switch_now })
    }
}

fn parse_agent_id(raw: &Value) -> Result<AgentId, SwitchParseError> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(SwitchParseError::NotNumeric(s.clone()));
            }
            trimmed
                .parse::<u32>()
                .map(AgentId::new)
                .map_err(|_| SwitchParseError::OutOfRange(s.clone()))
        }
        Value::Number(n) => match n.as_u64() {
            Some(v) => u32::try_from(v)
                .map(AgentId::new)
                .map_err(|_| SwitchParseError::OutOfRange(n.to_string())),
            None if n.is_i64() => Err(SwitchParseError::OutOfRange(n.to_string())),
            None => Err(SwitchParseError::NotNumeric(n.to_string())),
        },
        Value::Null => Err(SwitchParseError::MissingId),
        other => Err(SwitchParseError::NotNumeric(other.to_string())),
    }
}

#[cfg(test)]
#[path = "switch_tests.rs"]
mod tests;
