// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single logical session slot.

use crate::agent::{AgentDescriptor, AgentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one transport session from start request to teardown.
///
/// Every start issued by the orchestrator gets a fresh generation, and the
/// transport tags its lifecycle events with it so late events from a torn
/// down session can be told apart from events of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of the session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Disconnecting,
    /// Transient: entered on a transport error and always left for `Idle`
    /// within the same transition.
    ErrorRecovered,
}

impl SessionState {
    /// Connecting or Active.
    pub fn is_live(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Active => "active",
            SessionState::Disconnecting => "disconnecting",
            SessionState::ErrorRecovered => "error_recovered",
        };
        write!(f, "{}", s)
    }
}

/// How the transport should connect. Only realtime is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    #[default]
    Realtime,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Realtime => write!(f, "realtime"),
        }
    }
}

/// The one session slot of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub active_agent: Option<AgentDescriptor>,
    pub state: SessionState,
    pub started_at_ms: Option<u64>,
    /// Generation currently owning the slot; `None` while idle.
    pub generation: Option<SessionGeneration>,
    /// Whether "session started" was already written for this generation.
    pub(crate) announced: bool,
}

impl Session {
    pub fn idle() -> Self {
        Self {
            active_agent: None,
            state: SessionState::Idle,
            started_at_ms: None,
            generation: None,
            announced: false,
        }
    }

    pub(crate) fn connecting(agent: AgentDescriptor, generation: SessionGeneration) -> Self {
        Self {
            active_agent: Some(agent),
            state: SessionState::Connecting,
            started_at_ms: None,
            generation: Some(generation),
            announced: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Whether `generation` currently owns the slot.
    pub fn owns(&self, generation: SessionGeneration) -> bool {
        self.generation == Some(generation)
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        self.active_agent.as_ref().map(|a| a.id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

/// Read-only snapshot of the orchestrator for status readouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<SessionGeneration>,
    /// A start or end is awaiting the transport.
    pub busy: bool,
    /// Switch targets waiting behind the in-flight operation, oldest first.
    #[serde(default)]
    pub queued_switches: Vec<AgentId>,
    pub transcript_len: usize,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
