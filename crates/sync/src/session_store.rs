// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Current credentials, shared by the transport and the orchestrator.
//!
//! The session is held as an `Arc<Session>` snapshot. Every mutation first
//! persists the new state to `session.json`, then swaps the snapshot and
//! announces the change on a watch channel. Readers clone the `Arc` and never
//! observe a half-updated session.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use vital_core::{atomic, Session};

use crate::error::Result;

/// File name of the persisted session inside the state directory.
pub const FILE_NAME: &str = "session.json";

/// The most recent kind of change to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// Loaded from disk at startup.
    Restored,
    LoggedIn,
    Refreshed,
    /// Cleared by logout or by a rejected refresh.
    LoggedOut,
}

impl SessionChange {
    /// Returns true if a session is available after this change.
    pub fn has_session(&self) -> bool {
        !matches!(self, SessionChange::LoggedOut)
    }
}

pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<Arc<Session>>>,
    writes: Mutex<()>,
    changes: watch::Sender<SessionChange>,
}

impl SessionStore {
    /// Loads the session persisted at `path`, if any.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = path.to_path_buf();
        let session =
            tokio::task::spawn_blocking(move || atomic::read_json::<Session>(&file)).await??;

        let initial = if session.is_some() {
            SessionChange::Restored
        } else {
            SessionChange::LoggedOut
        };
        let (changes, _) = watch::channel(initial);
        Ok(SessionStore {
            path: path.to_path_buf(),
            current: RwLock::new(session.map(Arc::new)),
            writes: Mutex::new(()),
            changes,
        })
    }

    /// Returns the current session snapshot.
    pub fn snapshot(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    /// Replaces any existing session.
    pub async fn login(&self, session: Session) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.persist(Some(session.clone())).await?;
        info!(user = session.user_id(), "logged in");
        self.swap(Some(Arc::new(session)), SessionChange::LoggedIn);
        Ok(())
    }

    /// Installs tokens from a successful refresh of `used`.
    ///
    /// Does nothing and returns `None` if the session changed in the meantime
    /// (logout, login as someone else, or another refresh).
    pub async fn refresh(
        &self,
        used: &Arc<Session>,
        access_token: String,
        rotated_refresh: Option<String>,
    ) -> Result<Option<Arc<Session>>> {
        let _guard = self.writes.lock().await;
        if !self.is_current(used) {
            return Ok(None);
        }
        let next = used.refreshed(access_token, rotated_refresh);
        self.persist(Some(next.clone())).await?;
        let next = Arc::new(next);
        self.swap(Some(Arc::clone(&next)), SessionChange::Refreshed);
        info!(user = next.user_id(), "session refreshed");
        Ok(Some(next))
    }

    /// Clears `used` after the server refused it or its refresh token.
    pub async fn invalidate(&self, used: &Arc<Session>) -> Result<()> {
        let _guard = self.writes.lock().await;
        if !self.is_current(used) {
            return Ok(());
        }
        self.persist(None).await?;
        warn!(user = used.user_id(), "refresh rejected, session cleared");
        self.swap(None, SessionChange::LoggedOut);
        Ok(())
    }

    /// Clears the session.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.persist(None).await?;
        info!("logged out");
        self.swap(None, SessionChange::LoggedOut);
        Ok(())
    }

    fn is_current(&self, used: &Arc<Session>) -> bool {
        matches!(self.snapshot(), Some(current) if Arc::ptr_eq(&current, used))
    }

    fn swap(&self, next: Option<Arc<Session>>, change: SessionChange) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = next;
        self.changes.send_replace(change);
    }

    async fn persist(&self, session: Option<Session>) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || match session {
            Some(session) => atomic::write_json(&path, &session),
            None => atomic::remove(&path),
        })
        .await??;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
