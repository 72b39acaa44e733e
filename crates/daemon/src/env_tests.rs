// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::names;
use super::*;
use secrecy::ExposeSecret;
use std::sync::Mutex;

/// Tests in this module mutate process-wide state.
pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn constants_match_env_var_names() {
    assert_eq!(names::VITALSYNC_STATE_DIR, "VITALSYNC_STATE_DIR");
    assert_eq!(names::VITALSYNC_BASE_URL, "VITALSYNC_BASE_URL");
    assert_eq!(names::VITALSYNC_SIGNING_SECRET, "VITALSYNC_SIGNING_SECRET");
    assert_eq!(names::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(names::RUST_LOG, "RUST_LOG");
}

#[test]
fn state_dir_returns_path_when_set() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guard = EnvGuard::set(names::VITALSYNC_STATE_DIR, "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));
}

#[test]
fn state_dir_ignores_empty_value() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guard = EnvGuard::set(names::VITALSYNC_STATE_DIR, "");
    assert_eq!(state_dir(), None);
}

#[test]
fn xdg_state_home_returns_none_when_unset() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guard = EnvGuard::remove(names::XDG_STATE_HOME);
    assert_eq!(xdg_state_home(), None);
}

#[test]
fn signing_secret_is_read() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guard = EnvGuard::set(names::VITALSYNC_SIGNING_SECRET, "shh");
    assert_eq!(signing_secret().unwrap().expose_secret(), "shh");
}

#[test]
fn base_url_returns_none_when_unset() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guard = EnvGuard::remove(names::VITALSYNC_BASE_URL);
    assert_eq!(base_url(), None);
}

/// Sets or removes an env var and restores it on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => std::env::set_var(self.key, val),
            None => std::env::remove_var(self.key),
        }
    }
}
