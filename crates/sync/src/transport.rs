// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated delivery of payloads to the remote API.
//!
//! Every request carries the current bearer token. POST and PATCH bodies are
//! also signed (see [`crate::signing`]). A 401 triggers exactly one token
//! refresh followed by one retry; the outcome is then folded into a
//! [`Delivery`]. A retry that is refused again ends the session.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use vital_core::{ClockSource, Session};

use crate::config::SyncConfig;
use crate::http::{HttpClient, HttpError, HttpRequest, Method};
use crate::session_store::SessionStore;
use crate::signing::RequestSigner;

/// Endpoint used to exchange a refresh token for a new access token.
pub const REFRESH_ENDPOINT: &str = "auth/refresh";

/// Classified result of sending one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 2xx.
    Success,
    /// Still 401 after refreshing, or the refresh itself was refused.
    AuthExpired,
    /// Any other 4xx. Retrying the same payload will not help.
    ClientError(u16),
    /// 5xx, timeout, connection failure, or no session.
    ServerOrNetwork,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        matches!(self, Delivery::Success)
    }

    fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Delivery::Success,
            401 => Delivery::AuthExpired,
            400..=499 => Delivery::ClientError(status),
            _ => Delivery::ServerOrNetwork,
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

enum Renewal {
    Renewed(Arc<Session>),
    Rejected,
    Unreachable,
}

pub struct SignedTransport {
    http: Arc<dyn HttpClient>,
    sessions: Arc<SessionStore>,
    signer: RequestSigner,
    clock: Arc<dyn ClockSource>,
    config: SyncConfig,
}

impl SignedTransport {
    pub fn new(
        config: SyncConfig,
        http: Arc<dyn HttpClient>,
        sessions: Arc<SessionStore>,
        signer: RequestSigner,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        SignedTransport {
            http,
            sessions,
            signer,
            clock,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Sends `body` to `endpoint` under the current session.
    pub async fn send(&self, endpoint: &str, method: Method, body: &[u8]) -> Delivery {
        let Some(session) = self.sessions.snapshot() else {
            debug!(endpoint, "no session, delivery deferred");
            return Delivery::ServerOrNetwork;
        };

        let first = self.attempt(&session, endpoint, method, body).await;
        if first != Delivery::AuthExpired {
            return first;
        }

        debug!(endpoint, "access token rejected, refreshing");
        let renewed = match self.renew(&session).await {
            Renewal::Renewed(next) => next,
            Renewal::Rejected => return Delivery::AuthExpired,
            Renewal::Unreachable => return Delivery::ServerOrNetwork,
        };
        let retried = self.attempt(&renewed, endpoint, method, body).await;
        if retried == Delivery::AuthExpired {
            warn!(endpoint, "refreshed token rejected, signing out");
            if let Err(e) = self.sessions.invalidate(&renewed).await {
                error!(error = %e, "failed to clear rejected session");
            }
        }
        retried
    }

    async fn attempt(
        &self,
        session: &Session,
        endpoint: &str,
        method: Method,
        body: &[u8],
    ) -> Delivery {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", session.access_token()),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        if !method.is_idempotent() {
            headers.extend(self.signer.headers(self.clock.now().timestamp(), body));
        }

        let request = HttpRequest {
            method,
            url: self.config.endpoint_url(endpoint),
            headers,
            body: body.to_vec(),
            timeout: self.timeout(),
        };
        match self.http.execute(request).await {
            Ok(response) => {
                let delivery = Delivery::from_status(response.status);
                debug!(endpoint, %method, status = response.status, ?delivery, "request finished");
                delivery
            }
            Err(e) => {
                log_transport_error(endpoint, &e);
                Delivery::ServerOrNetwork
            }
        }
    }

    async fn renew(&self, used: &Arc<Session>) -> Renewal {
        // Another task may already have replaced the session.
        match self.sessions.snapshot() {
            Some(current) if !Arc::ptr_eq(&current, used) => return Renewal::Renewed(current),
            None => return Renewal::Rejected,
            Some(_) => {}
        }

        let body = match serde_json::to_vec(&RefreshRequest {
            refresh_token: used.refresh_token(),
        }) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "failed to encode refresh request");
                return Renewal::Unreachable;
            }
        };
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(self.signer.headers(self.clock.now().timestamp(), &body));

        let request = HttpRequest {
            method: Method::Post,
            url: self.config.endpoint_url(REFRESH_ENDPOINT),
            headers,
            body,
            timeout: self.timeout(),
        };
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                log_transport_error(REFRESH_ENDPOINT, &e);
                return Renewal::Unreachable;
            }
        };

        match response.status {
            200..=299 => {}
            400..=499 => {
                warn!(status = response.status, "refresh token rejected");
                if let Err(e) = self.sessions.invalidate(used).await {
                    error!(error = %e, "failed to clear rejected session");
                }
                return Renewal::Rejected;
            }
            status => {
                warn!(status, "refresh failed on the server");
                return Renewal::Unreachable;
            }
        }

        let tokens: RefreshResponse = match serde_json::from_slice(&response.body) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "malformed refresh response");
                return Renewal::Unreachable;
            }
        };
        match self
            .sessions
            .refresh(used, tokens.access_token, tokens.refresh_token)
            .await
        {
            Ok(Some(next)) => Renewal::Renewed(next),
            // Logged out while the refresh was in flight.
            Ok(None) => match self.sessions.snapshot() {
                Some(current) => Renewal::Renewed(current),
                None => Renewal::Rejected,
            },
            Err(e) => {
                error!(error = %e, "failed to persist refreshed session");
                Renewal::Unreachable
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.config.request_timeout
    }
}

fn log_transport_error(endpoint: &str, err: &HttpError) {
    match err {
        HttpError::Timeout => warn!(endpoint, "request timed out"),
        other => warn!(endpoint, error = %other, "request failed"),
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
