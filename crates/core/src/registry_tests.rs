// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn lookup_finds_registered_agent() {
    let registry = AgentRegistry::builtin();
    let agent = registry.lookup(AgentId::new(3)).unwrap();
    assert_eq!(agent.name, "Ananya");
    assert_eq!(agent.handle, "agent_3401kagj0de1efytk046757d9f4p");
}

#[test]
fn lookup_unknown_is_none() {
    let registry = AgentRegistry::builtin();
    assert!(registry.lookup(AgentId::new(99)).is_none());
    assert!(!registry.contains(AgentId::new(0)));
}

#[test]
fn default_agent_is_first_entry() {
    let registry = AgentRegistry::builtin();
    assert_eq!(registry.default_agent().id, AgentId::new(1));

    let registry = AgentRegistry::new(vec![
        AgentDescriptor::new(7, "h7", "seven"),
        AgentDescriptor::new(1, "h1", "one"),
    ])
    .unwrap();
    assert_eq!(registry.default_agent().id, AgentId::new(7));
}

#[test]
fn builtin_registry_passes_validation() {
    let builtin = AgentRegistry::builtin();
    let rebuilt = AgentRegistry::new(builtin.agents().to_vec()).unwrap();
    assert_eq!(rebuilt.len(), 6);
}

#[yare::parameterized(
    empty = {
        vec![],
        RegistryError::Empty
    },
    duplicate = {
        vec![AgentDescriptor::new(1, "a", "one"), AgentDescriptor::new(1, "b", "uno")],
        RegistryError::DuplicateId(AgentId::new(1))
    },
    blank_handle = {
        vec![AgentDescriptor::new(2, "  ", "two")],
        RegistryError::MissingHandle(AgentId::new(2))
    },
)]
fn invalid_registry_fails_at_load(agents: Vec<AgentDescriptor>, expected: RegistryError) {
    assert_eq!(AgentRegistry::new(agents).unwrap_err(), expected);
}
