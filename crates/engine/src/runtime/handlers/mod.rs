// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handling for the runtime

use super::Runtime;
use crate::error::RuntimeError;
use sb_adapters::TransportAdapter;
use sb_core::{Clock, Event};

impl<T, C> Runtime<T, C>
where
    T: TransportAdapter,
    C: Clock,
{
    /// Handle an incoming event and return any produced events
    pub async fn handle_event(&self, event: Event) -> Result<Vec<Event>, RuntimeError> {
        tracing::debug!(event = %event.log_summary(), "handling event");

        let now_ms = self.executor.clock().epoch_ms();
        let (effects, before, after) = {
            let mut machine = self.machine.lock();
            let before = machine.state();
            let effects = machine.handle(event, now_ms);
            (effects, before, machine.state())
        };

        if before != after {
            let view = self.view();
            tracing::info!(
                from = %before,
                to = %after,
                agent = ?view.agent.map(|a| a.id.get()),
                generation = ?view.generation.map(|g| g.get()),
                "session state changed"
            );
        }

        Ok(self.executor.execute_all(effects).await?)
    }
}
