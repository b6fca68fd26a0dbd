// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    AgentDescriptor, AgentId, AgentRegistry, Event, MachineConfig, SessionGeneration,
    SessionMachine, SwitchCommand, SwitchQueuePolicy,
};

// ── Fixtures ────────────────────────────────────────────────────────────────

/// Small registry with agents 1 (default), 2 and 3.
pub fn small_registry() -> AgentRegistry {
    let agents = vec![
        AgentDescriptor::new(1, "agent_one", "One"),
        AgentDescriptor::new(2, "agent_two", "Two"),
        AgentDescriptor::new(3, "agent_three", "Three"),
    ];
    match AgentRegistry::new(agents) {
        Ok(registry) => registry,
        Err(e) => unreachable!("fixture registry is valid: {e}"),
    }
}

pub fn machine() -> SessionMachine {
    SessionMachine::new(AgentRegistry::builtin(), MachineConfig::default())
}

pub fn machine_with_policy(policy: SwitchQueuePolicy) -> SessionMachine {
    let config = MachineConfig {
        switch_queue: policy,
        ..MachineConfig::default()
    };
    SessionMachine::new(AgentRegistry::builtin(), config)
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn switch_event(id: u32) -> Event {
    Event::SwitchRequested {
        command: SwitchCommand::now(AgentId::new(id)),
    }
}

pub fn send_event(text: &str) -> Event {
    Event::SendRequested {
        text: text.to_string(),
    }
}

pub fn start_ok(generation: u64) -> Event {
    Event::StartResolved {
        generation: SessionGeneration::new(generation),
        error: None,
    }
}

pub fn start_failed(generation: u64, detail: &str) -> Event {
    Event::StartResolved {
        generation: SessionGeneration::new(generation),
        error: Some(detail.to_string()),
    }
}

pub fn end_ok(generation: u64) -> Event {
    Event::EndResolved {
        generation: SessionGeneration::new(generation),
        error: None,
    }
}

pub fn end_failed(generation: u64, detail: &str) -> Event {
    Event::EndResolved {
        generation: SessionGeneration::new(generation),
        error: Some(detail.to_string()),
    }
}

pub fn connected(generation: u64) -> Event {
    Event::TransportConnected {
        generation: SessionGeneration::new(generation),
    }
}

pub fn disconnected(generation: u64) -> Event {
    Event::TransportDisconnected {
        generation: SessionGeneration::new(generation),
    }
}

pub fn agent_message(generation: u64, text: &str) -> Event {
    Event::TransportMessage {
        generation: SessionGeneration::new(generation),
        text: text.to_string(),
    }
}

pub fn transport_error(generation: u64, detail: &str) -> Event {
    Event::TransportError {
        generation: SessionGeneration::new(generation),
        detail: detail.to_string(),
    }
}
