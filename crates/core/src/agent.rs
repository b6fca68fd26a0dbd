// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and descriptor types.
//!
//! An agent is a conversational endpoint reachable through the transport.
//! Agents are addressed by a small numeric id (what the switch trigger
//! sends) and connected to through an opaque handle (what the transport
//! understands).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(u32);

impl AgentId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

crate::define_id! {
    /// Opaque token the transport uses to reach an agent.
    pub struct ConnectionHandle;
}

/// A registered agent. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub handle: ConnectionHandle,
    pub name: String,
}

impl AgentDescriptor {
    pub fn new(id: u32, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(id),
            handle: ConnectionHandle::new(handle),
            name: name.into(),
        }
    }
}

impl fmt::Display for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}
