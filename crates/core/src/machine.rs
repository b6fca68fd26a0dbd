// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session state machine.
//!
//! [`SessionMachine::handle`] is the only way the session slot and the
//! transcript change. It is deterministic and performs no I/O: it takes an
//! event plus the current time and returns the transport calls to make.
//! Outcomes of those calls come back later as `*Resolved` events.
//!
//! At most one start or end is outstanding at any time (`inflight`). While
//! one is, switch commands wait in `queue` and are replayed in order once it
//! settles. A new start is only ever issued after the previous session's
//! end has resolved, so transport sessions never overlap.

use crate::agent::{AgentDescriptor, AgentId};
use crate::effect::Effect;
use crate::event::Event;
use crate::id::UserId;
use crate::registry::AgentRegistry;
use crate::session::{ConnectionMode, Session, SessionGeneration, SessionState, SessionView};
use crate::switch::SwitchCommand;
use crate::transcript::{self, Transcript};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Switch commands held while a start or end is outstanding. Past this the
/// oldest queued switch is dropped.
pub const MAX_QUEUED_SWITCHES: usize = 16;

/// What to do with switch commands that arrive while a start or end is
/// still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchQueuePolicy {
    /// Replay every command in arrival order. A command for the same target
    /// as the one right before it is dropped.
    #[default]
    Fifo,
    /// Keep only the most recent command.
    Latest,
}

#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Identity for sessions started from the user surface
    pub default_user_id: UserId,
    /// Identity for sessions started by a switch command
    pub switch_user_id: UserId,
    pub switch_queue: SwitchQueuePolicy,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            default_user_id: UserId::new("Sandeep123"),
            switch_user_id: UserId::new("Sandeep"),
            switch_queue: SwitchQueuePolicy::Fifo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartOrigin {
    Manual,
    Switch,
}

/// The transport call currently outstanding.
#[derive(Debug, Clone)]
enum Inflight {
    Start {
        generation: SessionGeneration,
        agent_id: AgentId,
        origin: StartOrigin,
        /// User asked to end while the start was pending
        end_requested: bool,
    },
    End {
        generation: SessionGeneration,
        /// Switch target to start once the end settles
        then: Option<AgentDescriptor>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queued {
    Switch(AgentId),
    Start,
}

pub struct SessionMachine {
    registry: AgentRegistry,
    config: MachineConfig,
    session: Session,
    transcript: Transcript,
    inflight: Option<Inflight>,
    queue: VecDeque<Queued>,
    last_generation: u64,
}

impl SessionMachine {
    pub fn new(registry: AgentRegistry, config: MachineConfig) -> Self {
        Self {
            registry,
            config,
            session: Session::idle(),
            transcript: Transcript::new(),
            inflight: None,
            queue: VecDeque::new(),
            last_generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// A start or end is awaiting the transport.
    pub fn is_busy(&self) -> bool {
        self.inflight.is_some()
    }

    pub fn queued_switches(&self) -> Vec<AgentId> {
        self.queue
            .iter()
            .filter_map(|q| match q {
                Queued::Switch(id) => Some(*id),
                Queued::Start => None,
            })
            .collect()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.session.state,
            agent: self.session.active_agent.clone(),
            started_at_ms: self.session.started_at_ms,
            generation: self.session.generation,
            busy: self.is_busy(),
            queued_switches: self.queued_switches(),
            transcript_len: self.transcript.len(),
        }
    }

    /// Apply one event and return the transport calls it requires.
    pub fn handle(&mut self, event: Event, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::StartRequested => self.on_start_requested(&mut effects),
            Event::EndRequested => self.on_end_requested(&mut effects),
            Event::SendRequested { text } => self.on_send_requested(text, &mut effects),
            Event::SwitchRequested { command } => self.on_switch_requested(command, &mut effects),
            Event::StartResolved { generation, error } => {
                self.on_start_resolved(generation, error, &mut effects)
            }
            Event::EndResolved { generation, error } => {
                self.on_end_resolved(generation, error, &mut effects)
            }
            Event::SendResolved { generation, error } => self.on_send_resolved(generation, error),
            Event::TransportConnected { generation } => self.on_connected(generation, now_ms),
            Event::TransportDisconnected { generation } => {
                self.on_disconnected(generation, &mut effects)
            }
            Event::TransportMessage { generation, text } => self.on_message(generation, text),
            Event::TransportError { generation, detail } => {
                self.on_error(generation, detail, &mut effects)
            }
            Event::Shutdown => {}
        }
        effects
    }

    // -- user surface --

    fn on_start_requested(&mut self, effects: &mut Vec<Effect>) {
        if !self.session.is_idle() {
            debug!(state = %self.session.state, "start ignored: session not idle");
            return;
        }
        if self.inflight.is_some() {
            // Slot was released while a call is still settling
            if !self.queue.contains(&Queued::Start) {
                self.queue.push_back(Queued::Start);
            }
            return;
        }
        let agent = self.registry.default_agent().clone();
        self.begin_start(agent, StartOrigin::Manual, effects);
    }

    fn on_end_requested(&mut self, effects: &mut Vec<Effect>) {
        let Some(generation) = self.session.generation else {
            debug!("end ignored: session idle");
            return;
        };
        match &mut self.inflight {
            Some(Inflight::Start {
                generation: pending,
                end_requested,
                ..
            }) if *pending == generation => {
                *end_requested = true;
            }
            Some(_) => debug!("end ignored: teardown already in progress"),
            None => self.begin_end(generation, None, effects),
        }
    }

    fn on_send_requested(&mut self, text: String, effects: &mut Vec<Effect>) {
        if text.trim().is_empty() {
            return;
        }
        let generation = match (self.session.state, self.session.generation) {
            (SessionState::Active, Some(generation)) => generation,
            (state, _) => {
                debug!(%state, "send rejected");
                self.transcript.warning(transcript::SEND_REJECTED);
                return;
            }
        };
        self.transcript.user(text.clone());
        effects.push(Effect::SendMessage { generation, text });
    }

    // -- switch --

    fn on_switch_requested(&mut self, command: SwitchCommand, effects: &mut Vec<Effect>) {
        if !command.switch_now {
            debug!(agent_id = %command.target, "switch command without switch flag ignored");
            return;
        }
        let Some(agent) = self.registry.lookup(command.target).cloned() else {
            warn!(agent_id = %command.target, "no agent matches switch target, discarding");
            return;
        };
        if self.inflight.is_some() || !self.queue.is_empty() {
            self.enqueue_switch(agent.id);
            return;
        }
        self.switch_to(agent, effects);
    }

    fn switch_to(&mut self, agent: AgentDescriptor, effects: &mut Vec<Effect>) {
        match self.session.generation {
            Some(generation) => {
                info!(
                    from = ?self.session.agent_id(),
                    to = %agent.id,
                    "switching agent, ending current session first"
                );
                self.begin_end(generation, Some(agent), effects);
            }
            None => {
                info!(to = %agent.id, "switching agent");
                self.begin_start(agent, StartOrigin::Switch, effects);
            }
        }
    }

    fn enqueue_switch(&mut self, target: AgentId) {
        match self.config.switch_queue {
            SwitchQueuePolicy::Fifo => {
                if self.pipeline_tail() == Some(target) {
                    debug!(%target, "switch coalesced with pending command");
                    return;
                }
                if self.queued_switch_count() >= MAX_QUEUED_SWITCHES {
                    self.drop_oldest_switch();
                }
                self.queue.push_back(Queued::Switch(target));
            }
            SwitchQueuePolicy::Latest => {
                self.queue.retain(|q| !matches!(q, Queued::Switch(_)));
                if self.inflight_switch_target() == Some(target) {
                    debug!(%target, "switch coalesced with in-flight command");
                    return;
                }
                self.queue.push_back(Queued::Switch(target));
            }
        }
        debug!(%target, queued = self.queue.len(), "switch queued behind in-flight operation");
    }

    fn queued_switch_count(&self) -> usize {
        self.queue
            .iter()
            .filter(|q| matches!(q, Queued::Switch(_)))
            .count()
    }

    fn drop_oldest_switch(&mut self) {
        let Some(index) = self.queue.iter().position(|q| matches!(q, Queued::Switch(_))) else {
            return;
        };
        if let Some(Queued::Switch(dropped)) = self.queue.remove(index) {
            warn!(
                agent_id = %dropped,
                limit = MAX_QUEUED_SWITCHES,
                "switch queue full, dropping oldest command"
            );
        }
    }

    /// Target the session will end up on once everything pending has run.
    fn pipeline_tail(&self) -> Option<AgentId> {
        self.queue
            .iter()
            .rev()
            .find_map(|q| match q {
                Queued::Switch(id) => Some(*id),
                Queued::Start => None,
            })
            .or_else(|| self.inflight_switch_target())
    }

    fn inflight_switch_target(&self) -> Option<AgentId> {
        match &self.inflight {
            Some(Inflight::Start {
                agent_id,
                origin: StartOrigin::Switch,
                ..
            }) => Some(*agent_id),
            Some(Inflight::End {
                then: Some(agent), ..
            }) => Some(agent.id),
            _ => None,
        }
    }

    fn drain_queue(&mut self, effects: &mut Vec<Effect>) {
        while self.inflight.is_none() {
            let Some(next) = self.queue.pop_front() else {
                return;
            };
            match next {
                Queued::Switch(target) => {
                    // Resolved again at dequeue time
                    let Some(agent) = self.registry.lookup(target).cloned() else {
                        warn!(agent_id = %target, "queued switch target no longer registered");
                        continue;
                    };
                    self.switch_to(agent, effects);
                }
                Queued::Start => {
                    if self.session.is_idle() {
                        let agent = self.registry.default_agent().clone();
                        self.begin_start(agent, StartOrigin::Manual, effects);
                    }
                }
            }
        }
    }

    // -- transport calls --

    fn begin_start(
        &mut self,
        agent: AgentDescriptor,
        origin: StartOrigin,
        effects: &mut Vec<Effect>,
    ) {
        self.last_generation += 1;
        let generation = SessionGeneration::new(self.last_generation);
        let user_id = match origin {
            StartOrigin::Manual => self.config.default_user_id.clone(),
            StartOrigin::Switch => self.config.switch_user_id.clone(),
        };
        self.session = Session::connecting(agent.clone(), generation);
        self.inflight = Some(Inflight::Start {
            generation,
            agent_id: agent.id,
            origin,
            end_requested: false,
        });
        effects.push(Effect::StartSession {
            generation,
            agent,
            user_id,
            mode: ConnectionMode::Realtime,
        });
    }

    fn begin_end(
        &mut self,
        generation: SessionGeneration,
        then: Option<AgentDescriptor>,
        effects: &mut Vec<Effect>,
    ) {
        if self.session.owns(generation) {
            self.session.state = SessionState::Disconnecting;
        }
        self.inflight = Some(Inflight::End { generation, then });
        effects.push(Effect::EndSession { generation });
    }

    fn on_start_resolved(
        &mut self,
        generation: SessionGeneration,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        let (origin, agent_id, end_requested) = match self.inflight {
            Some(Inflight::Start {
                generation: pending,
                origin,
                agent_id,
                end_requested,
            }) if pending == generation => (origin, agent_id, end_requested),
            _ => {
                debug!(%generation, "stale start resolution ignored");
                return;
            }
        };
        self.inflight = None;

        if let Some(detail) = error {
            warn!(%generation, agent_id = %agent_id, %detail, "failed to start session");
            if self.session.owns(generation) {
                self.session = Session::idle();
            }
            self.transcript.warning(transcript::START_FAILED);
            self.drain_queue(effects);
            return;
        }

        if !self.session.owns(generation) {
            // Released by an error while connecting; do not leave it running
            warn!(%generation, "session released before start completed, tearing it down");
            self.begin_end(generation, None, effects);
            return;
        }

        // Connecting -> Active happens only on the transport's connected event
        if origin == StartOrigin::Switch {
            self.transcript.notice(format!("Switched to agent {}", agent_id));
        }
        if end_requested {
            self.begin_end(generation, None, effects);
            return;
        }
        self.drain_queue(effects);
    }

    fn on_end_resolved(
        &mut self,
        generation: SessionGeneration,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        let then = match &mut self.inflight {
            Some(Inflight::End {
                generation: pending,
                then,
            }) if *pending == generation => then.take(),
            _ => {
                debug!(%generation, "stale end resolution ignored");
                return;
            }
        };
        self.inflight = None;

        match error {
            None => {
                self.release_ended(generation);
            }
            Some(detail) => {
                warn!(%generation, %detail, "failed to end session, continuing anyway");
                if self.session.owns(generation) {
                    self.session = Session::idle();
                    self.transcript.warning(transcript::END_FAILED);
                }
            }
        }

        match then {
            Some(agent) => self.begin_start(agent, StartOrigin::Switch, effects),
            None => self.drain_queue(effects),
        }
    }

    fn on_send_resolved(&mut self, generation: SessionGeneration, error: Option<String>) {
        if let Some(detail) = error {
            warn!(%generation, %detail, "failed to send message");
            self.transcript.warning(transcript::SEND_FAILED);
        }
    }

    // -- transport callbacks --

    fn on_connected(&mut self, generation: SessionGeneration, now_ms: u64) {
        if !self.session.owns(generation) {
            debug!(%generation, "stale connected event ignored");
            return;
        }
        match self.session.state {
            SessionState::Connecting => self.session.state = SessionState::Active,
            SessionState::Active => {}
            state => {
                debug!(%generation, %state, "connected event ignored");
                return;
            }
        }
        self.session.started_at_ms.get_or_insert(now_ms);
        if !self.session.announced {
            self.session.announced = true;
            self.transcript.notice(transcript::SESSION_STARTED);
        }
    }

    fn on_disconnected(&mut self, generation: SessionGeneration, effects: &mut Vec<Effect>) {
        if !self.release_ended(generation) {
            debug!(%generation, "stale disconnected event ignored");
            return;
        }
        self.drain_queue(effects);
    }

    fn on_message(&mut self, generation: SessionGeneration, text: String) {
        if text.is_empty() {
            return;
        }
        if !self.session.owns(generation) {
            debug!(%generation, "late message from ended session");
        }
        self.transcript.agent(text);
    }

    fn on_error(
        &mut self,
        generation: SessionGeneration,
        detail: String,
        effects: &mut Vec<Effect>,
    ) {
        warn!(%generation, %detail, "transport error");
        self.transcript.warning(transcript::CONVERSATION_ERROR);
        if !self.session.owns(generation) {
            return;
        }
        self.session.state = SessionState::ErrorRecovered;
        debug!(%generation, "session released after transport error");
        self.session = Session::idle();
        if self.inflight.is_none() {
            // Best-effort cleanup in case the transport did not drop the session
            self.begin_end(generation, None, effects);
        }
    }

    /// Release the slot after a clean teardown. Returns false if `generation`
    /// no longer owns it.
    fn release_ended(&mut self, generation: SessionGeneration) -> bool {
        if !self.session.owns(generation) {
            return false;
        }
        self.session = Session::idle();
        self.transcript.notice(transcript::SESSION_ENDED);
        true
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
