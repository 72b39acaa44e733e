// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control socket of a running daemon.
//!
//! The same [`dispatch`] serves requests arriving on the socket and
//! requests run in-process when no daemon is up.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vital_core::Session;
use vital_ipc::{framing, DaemonStatus, Request, Response};
use vital_sync::{OrchestratorHandle, Trigger};

use crate::error::{Error, Result};

/// Time allowed to connect to the daemon or to receive a request.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed for the daemon to answer. Covers a full cycle.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs one request against the engine behind `handle`.
pub async fn dispatch(
    handle: &OrchestratorHandle,
    request: Request,
    started: Instant,
    daemon: bool,
) -> Response {
    match execute(handle, request, started, daemon).await {
        Ok(response) => response,
        Err(e) => Response::Error {
            message: e.to_string(),
        },
    }
}

async fn execute(
    handle: &OrchestratorHandle,
    request: Request,
    started: Instant,
    daemon: bool,
) -> Result<Response> {
    let engine = handle.engine();
    Ok(match request {
        Request::Ping => Response::Pong,
        Request::Status => Response::Status {
            status: DaemonStatus {
                pid: std::process::id(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_secs: started.elapsed().as_secs(),
                daemon,
                engine: engine.status().await?,
            },
        },
        Request::Sync => Response::Cycle {
            report: handle.sync_now(Trigger::Manual).await?,
        },
        Request::Wake => Response::Wake {
            result: handle.background_wake().await,
        },
        Request::Drain => Response::Drain {
            report: handle.drain().await?,
        },
        Request::Meal { at } => Response::Meal {
            accepted: handle.meal_logged(at).await?,
        },
        Request::Login {
            access_token,
            refresh_token,
            user_id,
        } => {
            engine
                .sessions()
                .login(Session::new(access_token, refresh_token, user_id))
                .await?;
            Response::Ok
        }
        Request::Logout => {
            engine.sessions().logout().await?;
            Response::Ok
        }
        Request::Shutdown => Response::ShuttingDown,
    })
}

/// Accepts control connections until `cancel` fires.
///
/// A `Shutdown` request is answered, then cancels `cancel`.
pub async fn serve(
    listener: UnixListener,
    handle: OrchestratorHandle,
    started: Instant,
    cancel: CancellationToken,
) {
    loop {
        let stream = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };
        let handle = handle.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &handle, started, &cancel).await {
                warn!(error = %e, "control connection failed");
            }
        });
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    handle: &OrchestratorHandle,
    started: Instant,
    cancel: &CancellationToken,
) -> std::io::Result<()> {
    let request: Request = tokio::time::timeout(IO_TIMEOUT, framing::read_message(&mut stream))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "request timed out"))??;
    debug!(?request, "control request");

    let shutdown = matches!(request, Request::Shutdown);
    let response = dispatch(handle, request, started, true).await;
    framing::write_message(&mut stream, &response).await?;
    if shutdown {
        info!("shutdown requested over control socket");
        cancel.cancel();
    }
    Ok(())
}

/// A connection to a running daemon.
pub struct ControlClient {
    stream: UnixStream,
}

impl ControlClient {
    pub async fn connect(socket_path: &Path) -> std::io::Result<Self> {
        let stream = tokio::time::timeout(IO_TIMEOUT, UnixStream::connect(socket_path))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;
        Ok(ControlClient { stream })
    }

    /// Sends one request and waits for its response.
    pub async fn request(mut self, request: &Request) -> Result<Response> {
        framing::write_message(&mut self.stream, request).await?;
        let reply = framing::read_message(&mut self.stream);
        let response = tokio::time::timeout(RESPONSE_TIMEOUT, reply)
            .await
            .map_err(|_| Error::Daemon(format!("no answer to {} request", request.name())))??;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
