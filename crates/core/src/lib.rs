// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-core: Core library for the Switchboard session orchestrator
//!
//! Everything in this crate is synchronous and free of I/O. The session
//! state machine consumes [`Event`]s and produces [`Effect`]s; adapters and
//! the engine perform the actual transport calls.

pub mod agent;
pub mod clock;
pub mod effect;
pub mod event;
pub mod id;
pub mod machine;
pub mod registry;
pub mod session;
pub mod switch;
pub mod traced;
pub mod transcript;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentDescriptor, AgentId, ConnectionHandle};
pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::Effect;
pub use event::Event;
pub use id::UserId;
pub use machine::{MachineConfig, SessionMachine, SwitchQueuePolicy, MAX_QUEUED_SWITCHES};
pub use registry::{AgentRegistry, RegistryError};
pub use session::{ConnectionMode, Session, SessionGeneration, SessionState, SessionView};
pub use switch::{SwitchCommand, SwitchParseError, NEW_DATA_EVENT};
pub use traced::TracedEffect;
pub use transcript::{EntryKind, Origin, Transcript, TranscriptEntry};
