// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running host for the sync engine.
//!
//! Holds the instance lock, writes a PID file, and serves the control
//! socket while the orchestrator and scheduler run.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vital_core::SystemClock;
use vital_sync::{
    EngineDeps, Orchestrator, ReqwestClient, RequestSigner, Scheduler, SyncEngine, SyncError,
};

use crate::config::DaemonConfig;
use crate::control;
use crate::error::{Error, Result};
use crate::export_store::ExportFileStore;
use crate::paths::Paths;

/// Takes the single-instance lock. Held for as long as the file lives.
pub fn acquire_lock(lock_path: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    if let Some(dir) = lock_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(lock_path.to_path_buf()))?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, std::process::id().to_string())
}

fn cleanup(paths: &Paths) {
    let _ = fs::remove_file(&paths.pid);
    let _ = fs::remove_file(&paths.socket);
}

/// Builds the engine from `config.toml` and the environment.
pub async fn open_engine(paths: &Paths) -> Result<Arc<SyncEngine>> {
    let config = DaemonConfig::load(&paths.state_dir)?;
    let sync_config = config.sync_config()?;
    let signer = RequestSigner::new(config.signing_secret(&paths.state_dir)?)?;
    let export = config.health_export_path(&paths.state_dir);
    info!(export = %export.display(), base_url = %sync_config.base_url, "opening engine");

    let http = ReqwestClient::new().map_err(|e| SyncError::Config(e.to_string()))?;
    let engine = SyncEngine::open(
        sync_config,
        &paths.state_dir,
        EngineDeps {
            http: Arc::new(http),
            health: Arc::new(ExportFileStore::new(&export, config.export_poll_interval())),
            signer,
            clock: Arc::new(SystemClock),
        },
    )
    .await?;
    Ok(Arc::new(engine))
}

/// Runs until SIGINT, SIGTERM, or a `Shutdown` request.
pub async fn run(paths: &Paths) -> Result<()> {
    info!(state_dir = %paths.state_dir.display(), "vitald starting");
    let lock = acquire_lock(&paths.lock)?;
    write_pid_file(&paths.pid)?;

    let result = serve(paths).await;
    if let Err(e) = &result {
        error!(error = %e, "vitald failed");
    }

    cleanup(paths);
    drop(lock);
    info!("vitald stopped");
    result
}

async fn serve(paths: &Paths) -> Result<()> {
    let engine = open_engine(paths).await?;

    // A socket left by a crashed instance; the lock proves it is stale.
    let _ = fs::remove_file(&paths.socket);
    let listener = UnixListener::bind(&paths.socket)?;
    info!(socket = %paths.socket.display(), "listening");

    let started = Instant::now();
    let cancel = CancellationToken::new();
    let (handle, orchestrator) = Orchestrator::spawn(engine, cancel.child_token());
    let scheduler = Scheduler::new(handle.clone(), cancel.child_token()).spawn();
    let server = tokio::spawn(control::serve(listener, handle, started, cancel.clone()));

    println!("READY");
    let _ = std::io::stdout().flush();

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = shutdown_signal() => {
            info!("signal received, shutting down");
            cancel.cancel();
        }
    }

    let tasks = [
        ("orchestrator", orchestrator),
        ("scheduler", scheduler),
        ("control", server),
    ];
    for (name, task) in tasks {
        if let Err(e) = task.await {
            warn!(task = name, error = %e, "task ended abnormally");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
