// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentId;

fn gen(n: u64) -> SessionGeneration {
    SessionGeneration::new(n)
}

#[test]
fn event_json_format_shutdown() {
    let json = serde_json::to_string(&Event::Shutdown).unwrap();
    assert_eq!(json, r#"{"type":"system:shutdown"}"#);
}

#[test]
fn resolved_ok_omits_error_field() {
    let event = Event::StartResolved {
        generation: gen(2),
        error: None,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"type":"start:resolved","generation":2}"#);

    let parsed: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, event);
}

#[test]
fn switch_event_carries_command() {
    let event = Event::SwitchRequested {
        command: SwitchCommand::now(AgentId::new(3)),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "switch:requested",
            "command": {"target": 3, "switch_now": true}
        })
    );
}

#[yare::parameterized(
    start     = { Event::StartRequested, "session:start" },
    send      = { Event::SendRequested { text: "hello".into() }, "session:send len=5" },
    switch    = { Event::SwitchRequested { command: SwitchCommand::now(AgentId::new(4)) }, "switch:requested target=4 now=true" },
    end_ok    = { Event::EndResolved { generation: gen(1), error: None }, "end:resolved gen=1 ok" },
    end_err   = { Event::EndResolved { generation: gen(1), error: Some("boom".into()) }, "end:resolved gen=1 error=boom" },
    message   = { Event::TransportMessage { generation: gen(3), text: "abc".into() }, "transport:message gen=3 len=3" },
    error     = { Event::TransportError { generation: gen(3), detail: "lost".into() }, "transport:error gen=3 detail=lost" },
)]
fn log_summary(event: Event, expected: &str) {
    assert_eq!(event.log_summary(), expected);
}

#[test]
fn generation_only_for_transport_events() {
    assert_eq!(Event::StartRequested.generation(), None);
    assert_eq!(
        Event::TransportDisconnected { generation: gen(7) }.generation(),
        Some(gen(7))
    );
}
