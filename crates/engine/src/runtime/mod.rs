// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime for the Switchboard engine

mod handlers;

use crate::executor::Executor;
use sb_adapters::{TransportAdapter, TransportStatus};
use sb_core::{
    AgentDescriptor, AgentId, AgentRegistry, Clock, MachineConfig, SessionMachine, SessionView,
    TranscriptEntry,
};

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Agent catalogue and machine settings
pub struct RuntimeConfig {
    pub registry: AgentRegistry,
    pub machine: MachineConfig,
}

/// Runtime adapter dependencies
pub struct RuntimeDeps<T> {
    pub transport: T,
}

/// Runtime that coordinates the system
///
/// Owns the session machine. Events are applied one at a time under its
/// lock; the lock is never held across a transport call.
pub struct Runtime<T, C: Clock> {
    pub(crate) executor: Executor<T, C>,
    pub(crate) machine: Mutex<SessionMachine>,
}

impl<T, C> Runtime<T, C>
where
    T: TransportAdapter,
    C: Clock,
{
    /// Create a new runtime
    pub fn new(
        deps: RuntimeDeps<T>,
        clock: C,
        config: RuntimeConfig,
        event_tx: mpsc::Sender<sb_core::Event>,
    ) -> Self {
        Self {
            executor: Executor::new(deps.transport, clock, event_tx),
            machine: Mutex::new(SessionMachine::new(config.registry, config.machine)),
        }
    }

    /// Get a reference to the clock
    pub fn clock(&self) -> &C {
        self.executor.clock()
    }

    /// Read-only snapshot of the session slot
    pub fn view(&self) -> SessionView {
        self.machine.lock().view()
    }

    /// Transcript entries with a sequence number greater than `since`
    pub fn transcript_since(&self, since: u64) -> Vec<TranscriptEntry> {
        self.machine.lock().transcript().since(since).to_vec()
    }

    pub fn transport_status(&self) -> TransportStatus {
        self.executor.transport_status()
    }

    pub fn knows_agent(&self, id: AgentId) -> bool {
        self.machine.lock().registry().contains(id)
    }

    pub fn agents(&self) -> Vec<AgentDescriptor> {
        self.machine.lock().registry().agents().to_vec()
    }

    /// No session is held and no start or end is outstanding.
    pub fn is_settled(&self) -> bool {
        let machine = self.machine.lock();
        machine.session().is_idle() && !machine.is_busy()
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
