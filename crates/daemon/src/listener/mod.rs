// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and
//! handling them without blocking the engine loop. Requests that change the
//! session become events on the EventBus; everything else is answered from
//! the runtime's read-only accessors.

use std::sync::Arc;
use std::time::Instant;

use sb_core::{Event, SwitchCommand, NEW_DATA_EVENT};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::event_bus::EventBus;
use crate::lifecycle::DaemonRuntime;
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// Everything a request handler can see.
pub struct ListenCtx {
    pub event_bus: EventBus,
    pub runtime: Arc<DaemonRuntime>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: ListenCtx) -> Self {
        Self {
            socket,
            ctx: Arc::new(ctx),
        }
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    // Polling requests are frequent
    if matches!(
        request,
        Request::Status | Request::Transcript { .. } | Request::Ping
    ) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx);
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

/// Handle a single request and return a response.
pub(crate) fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Trigger { event, data } => handle_trigger(ctx, &event, &data),

        Request::Start => emit(ctx, Event::StartRequested),

        Request::End => emit(ctx, Event::EndRequested),

        Request::Send { text } => {
            if text.trim().is_empty() {
                return Response::Ignored {
                    reason: "empty message".to_string(),
                };
            }
            emit(ctx, Event::SendRequested { text })
        }

        Request::Status => Response::Status {
            view: ctx.runtime.view(),
            transport: ctx.runtime.transport_status(),
        },

        Request::Agents => Response::Agents {
            agents: ctx.runtime.agents(),
        },

        Request::Transcript { since } => Response::Transcript {
            entries: ctx.runtime.transcript_since(since),
        },

        Request::Shutdown => {
            info!(
                uptime_secs = ctx.start_time.elapsed().as_secs(),
                "shutdown requested"
            );
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

/// Switch trigger channel: only `newData` payloads with `isend == "true"`
/// and a registered id become switch commands.
fn handle_trigger(ctx: &ListenCtx, event: &str, data: &serde_json::Value) -> Response {
    if event != NEW_DATA_EVENT {
        debug!(event, "ignoring trigger");
        return ignored(format!("unsupported event {event:?}"));
    }

    let command = match SwitchCommand::from_payload(data) {
        Ok(command) => command,
        Err(e) => {
            warn!(error = %e, "discarding switch trigger");
            return ignored(e.to_string());
        }
    };

    if !command.switch_now {
        debug!(agent_id = %command.target, "trigger without switch flag");
        return ignored("switch not requested".to_string());
    }

    if !ctx.runtime.knows_agent(command.target) {
        warn!(agent_id = %command.target, "unknown switch target");
        return ignored(format!("unknown agent {}", command.target));
    }

    emit(ctx, Event::SwitchRequested { command })
}

fn emit(ctx: &ListenCtx, event: Event) -> Response {
    match ctx.event_bus.send(event) {
        Ok(()) => Response::Ok,
        Err(e) => {
            error!("Failed to queue event: {}", e);
            Response::Error {
                message: e.to_string(),
            }
        }
    }
}

fn ignored(reason: String) -> Response {
    Response::Ignored { reason }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
