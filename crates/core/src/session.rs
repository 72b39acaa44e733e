// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session credentials.
//!
//! A session is replaced as a whole: login builds a new one, a token refresh
//! derives a new one from the old, logout drops it. Holders share it behind an
//! `Arc`, so a reader never sees an access token paired with the wrong
//! refresh token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access and refresh credentials for one user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    user_id: String,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Session {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user_id: user_id.into(),
        }
    }

    /// Short-lived bearer credential.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Long-lived credential used only against the refresh endpoint.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the session produced by a successful refresh.
    ///
    /// The refresh token is kept unless the server rotated it.
    pub fn refreshed(
        &self,
        access_token: impl Into<String>,
        rotated_refresh: Option<String>,
    ) -> Self {
        Session {
            access_token: access_token.into(),
            refresh_token: rotated_refresh.unwrap_or_else(|| self.refresh_token.clone()),
            user_id: self.user_id.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
