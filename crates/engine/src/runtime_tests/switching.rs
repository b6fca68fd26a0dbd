// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switch commands against a live transport.

use super::*;

#[tokio::test]
async fn switch_from_idle_starts_with_switch_user() {
    let mut ctx = setup();
    ctx.dispatch(switch(4)).await;
    ctx.settle().await;

    let view = ctx.runtime.view();
    assert_eq!(view.state, SessionState::Active);
    assert_eq!(view.agent.map(|a| a.name), Some("Vineeta".to_string()));
    match ctx.transport.calls().as_slice() {
        [TransportCall::Start { user_id, .. }] => assert_eq!(user_id.as_str(), "Sandeep"),
        other => panic!("unexpected calls: {:?}", other),
    }
    // The transport reports connected before the start call returns
    assert_eq!(
        ctx.transcript_texts(),
        vec![transcript::SESSION_STARTED, "Switched to agent 4"]
    );
}

#[tokio::test]
async fn switch_while_active_never_overlaps() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    ctx.dispatch(switch(4)).await;
    ctx.settle().await;

    assert_eq!(start_calls(&ctx), vec![handle_of(&ctx, 1), handle_of(&ctx, 4)]);
    assert_eq!(ctx.transport.peak_live(), 1);
    assert_eq!(ctx.runtime.view().agent.map(|a| a.id), Some(AgentId::new(4)));
}

#[tokio::test]
async fn rapid_switches_with_slow_transport_apply_in_order() {
    let mut ctx = setup();
    ctx.transport.set_start_delay(Duration::from_millis(20));
    ctx.transport.set_end_delay(Duration::from_millis(20));
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    for id in [4, 5, 5, 3] {
        ctx.dispatch(switch(id)).await;
    }
    assert!(ctx.runtime.view().busy);
    ctx.settle().await;

    assert_eq!(
        start_calls(&ctx),
        vec![
            handle_of(&ctx, 1),
            handle_of(&ctx, 4),
            handle_of(&ctx, 5),
            handle_of(&ctx, 3)
        ]
    );
    assert_eq!(ctx.transport.peak_live(), 1);
    assert_eq!(ctx.transport.peak_concurrent_ops(), 1);
    assert_eq!(ctx.runtime.view().agent.map(|a| a.id), Some(AgentId::new(3)));
    assert!(ctx.runtime.view().queued_switches.is_empty());
}

#[tokio::test]
async fn latest_policy_skips_intermediate_targets() {
    let mut ctx = setup_with(sb_core::MachineConfig {
        switch_queue: SwitchQueuePolicy::Latest,
        ..Default::default()
    });
    ctx.transport.set_end_delay(Duration::from_millis(20));
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;

    for id in [4, 5, 6, 3] {
        ctx.dispatch(switch(id)).await;
    }
    ctx.settle().await;

    assert_eq!(
        start_calls(&ctx),
        vec![handle_of(&ctx, 1), handle_of(&ctx, 4), handle_of(&ctx, 3)]
    );
    assert_eq!(ctx.transport.peak_live(), 1);
}

#[tokio::test]
async fn switch_proceeds_when_end_fails() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;
    ctx.transport
        .set_end_error(TransportError::EndFailed("timeout".into()));

    ctx.dispatch(switch(2)).await;
    ctx.settle().await;

    assert_eq!(ctx.runtime.view().agent.map(|a| a.id), Some(AgentId::new(2)));
    assert!(ctx
        .transcript_texts()
        .contains(&transcript::END_FAILED.to_string()));
}

#[tokio::test]
async fn unknown_switch_target_changes_nothing() {
    let mut ctx = setup();
    ctx.dispatch(Event::StartRequested).await;
    ctx.settle().await;
    let before = ctx.runtime.view();

    ctx.dispatch(switch(42)).await;
    ctx.settle().await;

    assert_eq!(ctx.runtime.view(), before);
    assert_eq!(start_calls(&ctx).len(), 1);
    assert!(!ctx.runtime.knows_agent(AgentId::new(42)));
}
