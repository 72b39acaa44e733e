// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HMAC request signatures.
//!
//! A signed request carries the unix time it was signed at and
//! `hex(HMAC-SHA256(secret, "<timestamp>." + body))`, so the server can check
//! both integrity and freshness.

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{Result, SyncError};

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Sync-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Sync-Signature";

/// Signs request bodies with the shared secret.
#[derive(Clone)]
pub struct RequestSigner {
    keyed: HmacSha256,
}

impl RequestSigner {
    /// Creates a signer. An empty secret is rejected.
    pub fn new(secret: &SecretString) -> Result<Self> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(SyncError::Config(
                "signing secret is empty\n  hint: set VITALSYNC_SIGNING_SECRET or signing_secret in config.toml".to_string(),
            ));
        }
        let keyed = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| SyncError::Config(format!("unusable signing secret: {e}")))?;
        Ok(RequestSigner { keyed })
    }

    /// Returns the lowercase hex signature of `body` at `timestamp`.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Header pairs for a request signed at `timestamp`.
    pub fn headers(&self, timestamp: i64, body: &[u8]) -> [(String, String); 2] {
        [
            (TIMESTAMP_HEADER.to_string(), timestamp.to_string()),
            (SIGNATURE_HEADER.to_string(), self.sign(timestamp, body)),
        ]
    }

    /// Checks a signature in constant time.
    pub fn verify(&self, timestamp: i64, body: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;
