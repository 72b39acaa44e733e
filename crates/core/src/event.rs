// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline events: outbound payloads held locally until delivered.
//!
//! An event is created only when an immediate delivery attempt fails and is
//! destroyed only after the same payload bytes were delivered. The payload is
//! opaque to the queue: it is already encoded in the wire format of the target
//! endpoint and is never re-encoded or mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an offline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        EventId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A serialized outbound record waiting for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineEvent {
    id: EventId,
    endpoint: String,
    #[serde(rename = "payload_bytes", with = "payload_base64")]
    payload: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl OfflineEvent {
    /// Creates a new event with a fresh identifier.
    pub fn new(endpoint: impl Into<String>, payload: Vec<u8>, created_at: DateTime<Utc>) -> Self {
        OfflineEvent {
            id: EventId::new(),
            endpoint: endpoint.into(),
            payload,
            created_at,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Endpoint path the payload was originally addressed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The exact bytes that failed to deliver.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Payload bytes travel through JSON as standard base64.
mod payload_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
