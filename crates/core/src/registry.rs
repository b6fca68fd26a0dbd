// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static agent registry.
//!
//! Built once at startup from a fixed list. All validation happens in
//! [`AgentRegistry::new`]; lookups never fail for configuration reasons.

use crate::agent::{AgentDescriptor, AgentId};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration errors detected while building the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("agent registry is empty")]
    Empty,
    #[error("duplicate agent id {0}")]
    DuplicateId(AgentId),
    #[error("agent {0} has no connection handle")]
    MissingHandle(AgentId),
}

/// Read-only mapping from numeric agent id to descriptor.
///
/// Insertion order is preserved; the first entry is the default agent used
/// for manually started sessions.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentDescriptor>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<AgentDescriptor>) -> Result<Self, RegistryError> {
        if agents.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id) {
                return Err(RegistryError::DuplicateId(agent.id));
            }
            if agent.handle.as_str().trim().is_empty() {
                return Err(RegistryError::MissingHandle(agent.id));
            }
        }
        Ok(Self { agents })
    }

    /// The built-in agent list.
    pub fn builtin() -> Self {
        Self {
            agents: builtin_agents(),
        }
    }

    pub fn lookup(&self, id: AgentId) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.lookup(id).is_some()
    }

    /// First registered agent.
    pub fn default_agent(&self) -> &AgentDescriptor {
        // Non-empty by construction
        &self.agents[0]
    }

    pub fn agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn builtin_agents() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new(1, "agent_4001kc6cnz0deb9a29531s4ser5b", "test"),
        AgentDescriptor::new(6, "agent_9801kagjnzjqf798fvsj7n8627f4", "Vikram"),
        AgentDescriptor::new(5, "agent_0401kagjcxt1ekvrq6z2ywshvvp2", "PriyaMehta"),
        AgentDescriptor::new(4, "agent_4701kagjaeqsf83vdn3p83yaewqg", "Vineeta"),
        AgentDescriptor::new(3, "agent_3401kagj0de1efytk046757d9f4p", "Ananya"),
        AgentDescriptor::new(2, "agent_4501kae38yqaeh0sn0gq9bxsy3gr", "Rajeev"),
    ]
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
