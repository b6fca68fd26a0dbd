// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

mod sessions;
mod switching;

use super::*;
use crate::test_helpers::{setup, setup_with, TestContext};
use sb_adapters::{TransportCall, TransportError};
use sb_core::{
    transcript, AgentId, Event, SessionState, SwitchCommand, SwitchQueuePolicy,
};
use std::time::Duration;

fn switch(id: u32) -> Event {
    Event::SwitchRequested {
        command: SwitchCommand::now(AgentId::new(id)),
    }
}

fn start_calls(ctx: &TestContext) -> Vec<String> {
    ctx.transport
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            TransportCall::Start { handle, .. } => Some(handle.to_string()),
            _ => None,
        })
        .collect()
}

fn handle_of(ctx: &TestContext, id: u32) -> String {
    ctx.runtime
        .agents()
        .into_iter()
        .find(|a| a.id == AgentId::new(id))
        .map(|a| a.handle.to_string())
        .unwrap()
}
