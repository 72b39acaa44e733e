// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variables read by vitald.

use std::path::PathBuf;

use secrecy::SecretString;

/// Generated environment variable name constants.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `VITALSYNC_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(names::VITALSYNC_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(names::XDG_STATE_HOME).map(PathBuf::from)
}

/// Returns the value of `VITALSYNC_BASE_URL` if set.
pub fn base_url() -> Option<String> {
    non_empty(names::VITALSYNC_BASE_URL)
}

/// Returns the value of `VITALSYNC_SIGNING_SECRET` if set.
pub fn signing_secret() -> Option<SecretString> {
    non_empty(names::VITALSYNC_SIGNING_SECRET).map(SecretString::from)
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
pub(crate) mod tests;
