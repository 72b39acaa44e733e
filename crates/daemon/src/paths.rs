// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Files vitald keeps in its state directory.

use std::path::{Path, PathBuf};

use crate::env;

const APP_DIR: &str = "vitalsync";
const SOCKET_NAME: &str = "vitald.sock";
const PID_NAME: &str = "vitald.pid";
const LOCK_NAME: &str = "vitald.lock";
const LOG_NAME: &str = "vitald.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub socket: PathBuf,
    pub pid: PathBuf,
    pub lock: PathBuf,
    pub log: PathBuf,
}

impl Paths {
    pub fn new(state_dir: &Path) -> Self {
        Paths {
            state_dir: state_dir.to_path_buf(),
            socket: state_dir.join(SOCKET_NAME),
            pid: state_dir.join(PID_NAME),
            lock: state_dir.join(LOCK_NAME),
            log: state_dir.join(LOG_NAME),
        }
    }
}

/// Picks the state directory.
///
/// Order: `--state-dir`, `VITALSYNC_STATE_DIR`, `$XDG_STATE_HOME/vitalsync`,
/// then `~/.local/state/vitalsync`.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(APP_DIR);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(APP_DIR))
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
