// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual start, end, send and transport callbacks.

use super::*;

#[tokio::test]
async fn start_connects_and_announces() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    let view = ctx.runtime.view();
    assert_eq!(view.state, SessionState::Active);
    assert_eq!(view.agent.map(|a| a.id), Some(AgentId::new(1)));
    assert_eq!(view.started_at_ms, Some(ctx.clock.epoch_ms()));
    assert!(!view.busy);
    assert_eq!(ctx.transcript_texts(), vec![transcript::SESSION_STARTED]);

    match ctx.transport.calls().as_slice() {
        [TransportCall::Start { user_id, handle, .. }] => {
            assert_eq!(user_id.as_str(), "Sandeep123");
            assert_eq!(handle.to_string(), handle_of(&ctx, 1));
        }
        other => panic!("unexpected calls: {:?}", other),
    }
}

#[tokio::test]
async fn end_disconnects_and_settles() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    ctx.dispatch(Event::EndRequested).await;
    ctx.settle().await;

    assert!(ctx.runtime.is_settled());
    assert_eq!(
        ctx.transcript_texts(),
        vec![transcript::SESSION_STARTED, transcript::SESSION_ENDED]
    );
    assert!(ctx.transport.live_sessions().is_empty());
}

#[tokio::test]
async fn start_failure_leaves_slot_idle() {
    let mut ctx = setup();
    ctx.transport
        .set_start_error(TransportError::StartFailed("refused".into()));

    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    assert!(ctx.runtime.is_settled());
    assert_eq!(ctx.transcript_texts(), vec![transcript::START_FAILED]);
}

#[tokio::test]
async fn send_reaches_transport() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    ctx.dispatch(Event::SendRequested {
        text: "hello".into(),
    })
    .await;

    assert!(ctx.transport.calls().contains(&TransportCall::Send {
        text: "hello".into()
    }));
    assert_eq!(ctx.transcript_texts().last().map(String::as_str), Some("hello"));
}

#[tokio::test]
async fn send_failure_becomes_warning() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;
    ctx.transport
        .set_send_error(TransportError::SendFailed("socket closed".into()));

    ctx.dispatch(Event::SendRequested {
        text: "hello".into(),
    })
    .await;

    assert_eq!(
        ctx.transcript_texts().last().map(String::as_str),
        Some(transcript::SEND_FAILED)
    );
    assert_eq!(ctx.runtime.view().state, SessionState::Active);
}

#[tokio::test]
async fn send_without_session_is_rejected_locally() {
    let ctx = setup();
    ctx.dispatch(Event::SendRequested {
        text: "hello".into(),
    })
    .await;

    assert!(ctx.transport.calls().is_empty());
    assert_eq!(ctx.transcript_texts(), vec![transcript::SEND_REJECTED]);
}

#[tokio::test]
async fn agent_messages_land_in_transcript() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    assert!(ctx.transport.emit_message("hi, how can I help?").await);
    ctx.settle().await;

    let last = ctx.runtime.transcript_since(1);
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].text, "hi, how can I help?");
    assert_eq!(last[0].sequence, 2);
}

#[tokio::test]
async fn transport_error_releases_and_cleans_up() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    assert!(ctx.transport.emit_error("websocket dropped").await);
    ctx.settle().await;

    assert!(ctx.runtime.is_settled());
    assert_eq!(ctx.transport.calls().last(), Some(&TransportCall::End));
    assert!(ctx.transport.live_sessions().is_empty());
    assert_eq!(
        ctx.transcript_texts(),
        vec![transcript::SESSION_STARTED, transcript::CONVERSATION_ERROR]
    );
}

#[tokio::test]
async fn remote_disconnect_releases_slot() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    assert!(ctx.transport.emit_disconnected().await);
    ctx.settle().await;

    assert!(ctx.runtime.is_settled());
    assert_eq!(
        ctx.transcript_texts().last().map(String::as_str),
        Some(transcript::SESSION_ENDED)
    );
}

#[tokio::test]
async fn late_message_after_end_is_kept() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;
    ctx.dispatch(Event::EndRequested).await;
    ctx.settle().await;

    let generation = sb_core::SessionGeneration::new(1);
    assert!(
        ctx.transport
            .inject(Event::TransportMessage {
                generation,
                text: "goodbye".into(),
            })
            .await
    );
    ctx.settle().await;

    assert!(ctx.runtime.is_settled());
    assert_eq!(
        ctx.transcript_texts().last().map(String::as_str),
        Some("goodbye")
    );
}

#[tokio::test]
async fn started_at_follows_clock() {
    let mut ctx = setup();
    ctx.clock.advance(Duration::from_secs(30));
    let expected = ctx.clock.epoch_ms();

    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    assert_eq!(ctx.runtime.view().started_at_ms, Some(expected));
}
