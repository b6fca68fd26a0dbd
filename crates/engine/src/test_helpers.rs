// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{Runtime, RuntimeConfig, RuntimeDeps};
use sb_adapters::FakeTransport;
use sb_core::{AgentRegistry, Event, FakeClock, MachineConfig};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;

/// Convenience alias for the fully-typed test runtime.
pub(crate) type TestRuntime = Runtime<FakeTransport, FakeClock>;

/// How long the event channel must stay quiet before the system is
/// considered settled.
const QUIET: Duration = Duration::from_millis(100);

/// Test context holding the runtime and its fakes.
pub(crate) struct TestContext {
    pub runtime: TestRuntime,
    pub clock: FakeClock,
    pub event_rx: mpsc::Receiver<Event>,
    pub transport: FakeTransport,
}

pub(crate) fn setup() -> TestContext {
    setup_with(MachineConfig::default())
}

pub(crate) fn setup_with(machine: MachineConfig) -> TestContext {
    let transport = FakeTransport::new();
    let clock = FakeClock::new();
    let (event_tx, event_rx) = mpsc::channel(100);
    let runtime = Runtime::new(
        RuntimeDeps {
            transport: transport.clone(),
        },
        clock.clone(),
        RuntimeConfig {
            registry: AgentRegistry::builtin(),
            machine,
        },
        event_tx,
    );

    TestContext {
        runtime,
        clock,
        event_rx,
        transport,
    }
}

impl TestContext {
    /// Feed one event plus everything it produces synchronously.
    pub async fn dispatch(&self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            pending.extend(self.runtime.handle_event(event).await.unwrap());
        }
    }

    /// Process channel events until nothing arrives for a while.
    pub async fn settle(&mut self) {
        while let Ok(Some(event)) = tokio::time::timeout(QUIET, self.event_rx.recv()).await {
            self.dispatch(event).await;
        }
    }

    pub fn transcript_texts(&self) -> Vec<String> {
        self.runtime
            .transcript_since(0)
            .into_iter()
            .map(|e| e.text)
            .collect()
    }
}
