// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switchboard daemon library
//!
//! Hosts the session runtime behind a Unix socket. The protocol module is
//! also what clients use to talk to `sbd`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod event_bus;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod protocol;

pub use config::{ConfigError, Settings};
pub use event_bus::{EventBus, EventReader};
pub use lifecycle::{Config, DaemonRuntime, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
pub use protocol::{Request, Response, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
