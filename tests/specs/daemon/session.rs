//! Session orchestration specs over the daemon socket

use crate::prelude::*;
use sb_core::SessionState;
use sb_daemon::protocol::TransportStatus;
use sb_daemon::{Request, Response};
use serde_json::json;

fn switch_trigger(id: &str) -> Request {
    Request::Trigger {
        event: "newData".to_string(),
        data: json!({"isend": "true", "id": id}),
    }
}

/// Manual start with the default agent, then end.
#[test]
fn manual_start_and_end() {
    let daemon = Daemon::start();

    assert_eq!(daemon.request(&Request::Start), Response::Ok);
    daemon.wait_active(1);
    assert_eq!(daemon.transcript(), vec!["Session started"]);

    assert_eq!(daemon.request(&Request::End), Response::Ok);
    daemon.wait_idle();
    assert_eq!(daemon.transcript(), vec!["Session started", "Session ended"]);
}

#[test]
fn status_reports_transport_connection() {
    let daemon = Daemon::start();
    let (_, transport) = daemon.status_with_transport();
    assert_eq!(transport, TransportStatus::Disconnected);

    daemon.request(&Request::Start);
    daemon.wait_active(1);
    let (view, transport) = daemon.status_with_transport();
    assert_eq!(view.state, SessionState::Active);
    assert_eq!(transport, TransportStatus::Connected);

    daemon.request(&Request::End);
    daemon.wait_idle();
    let (_, transport) = daemon.status_with_transport();
    assert_eq!(transport, TransportStatus::Disconnected);
}

#[test]
fn send_while_idle_is_rejected_in_transcript() {
    let daemon = Daemon::start();

    assert_eq!(
        daemon.request(&Request::Send {
            text: "hello".into()
        }),
        Response::Ok
    );
    assert!(wait_for(SPEC_WAIT_MAX_MS, || daemon.transcript()
        == vec!["Cannot send message: no active session"]));
    assert_eq!(daemon.status().state, SessionState::Idle);
}

/// End the current agent, start the target, announce the switch.
#[test]
#[serial_test::serial]
fn switch_trigger_replaces_active_agent() {
    let daemon = Daemon::start();
    daemon.request(&Request::Start);
    daemon.wait_active(1);
    daemon.request(&Request::Send { text: "hi".into() });

    assert_eq!(daemon.request(&switch_trigger("3")), Response::Ok);
    daemon.wait_active(3);

    similar_asserts::assert_eq!(
        daemon.transcript(),
        vec![
            "Session started",
            "hi",
            "Session ended",
            "Session started",
            "Switched to agent 3",
        ]
    );
}

#[test]
fn unknown_switch_target_changes_nothing() {
    let daemon = Daemon::start();
    daemon.request(&Request::Start);
    daemon.wait_active(1);
    let before = daemon.transcript();

    assert!(matches!(
        daemon.request(&switch_trigger("99")),
        Response::Ignored { .. }
    ));

    let view = daemon.status();
    assert_eq!(view.state, SessionState::Active);
    assert_eq!(view.agent.map(|a| a.id.get()), Some(1));
    assert_eq!(daemon.transcript(), before);
}

#[test]
#[serial_test::serial]
fn back_to_back_switches_settle_on_last() {
    let daemon = Daemon::start();
    daemon.request(&Request::Start);
    daemon.wait_active(1);

    daemon.request(&switch_trigger("3"));
    daemon.request(&switch_trigger("4"));
    daemon.wait_active(4);

    let transcript = daemon.transcript();
    assert_eq!(
        transcript.last().map(String::as_str),
        Some("Switched to agent 4")
    );
    assert!(daemon.status().queued_switches.is_empty());
}

#[test]
fn configured_agents_are_listed() {
    let daemon = Daemon::start_with_config(Some(
        r#"
switch_queue = "latest"

[[agents]]
id = 10
handle = "agent_ten"
name = "Ten"

[[agents]]
id = 11
handle = "agent_eleven"
name = "Eleven"
"#,
    ));

    match daemon.request(&Request::Agents) {
        Response::Agents { agents } => {
            let names: Vec<_> = agents.into_iter().map(|a| a.name).collect();
            assert_eq!(names, vec!["Ten", "Eleven"]);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    daemon.request(&switch_trigger("11"));
    daemon.wait_active(11);
}
