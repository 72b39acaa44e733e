// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot commands.
//!
//! A command goes to the running daemon when its socket answers. Otherwise
//! it runs in-process under the instance lock, so two processes never
//! write the state directory at once.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use vital_ipc::{Request, Response};
use vital_sync::{Orchestrator, SyncError};

use crate::control::{self, ControlClient};
use crate::daemon::{acquire_lock, open_engine};
use crate::error::{Error, Result};
use crate::paths::Paths;

pub async fn execute(paths: &Paths, request: Request) -> Result<Response> {
    let response = match ControlClient::connect(&paths.socket).await {
        Ok(client) => {
            debug!(request = request.name(), "forwarding to daemon");
            client.request(&request).await?
        }
        Err(e) => {
            debug!(error = %e, "no daemon answering, running in-process");
            run_in_process(paths, request).await?
        }
    };
    match response {
        Response::Error { message } => Err(Error::Daemon(message)),
        other => Ok(other),
    }
}

async fn run_in_process(paths: &Paths, request: Request) -> Result<Response> {
    if matches!(request, Request::Shutdown | Request::Ping) {
        return Err(Error::Daemon("vitald is not running".to_string()));
    }
    let _lock = acquire_lock(&paths.lock)?;
    let engine = open_engine(paths).await?;

    let (orchestrator, handle) = Orchestrator::new(engine, CancellationToken::new());
    // An explicit drain reports the events it replays itself.
    let orchestrator = if matches!(request, Request::Drain) {
        orchestrator.without_startup_drain()
    } else {
        orchestrator
    };
    let task = tokio::spawn(orchestrator.run());
    let response = control::dispatch(&handle, request, Instant::now(), false).await;
    handle.shutdown().await;
    task.await.map_err(SyncError::from)?;
    Ok(response)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
