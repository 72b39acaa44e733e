// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control protocol between `vitald` commands and a running daemon.
//!
//! Messages are serialized as JSON with length-prefixed framing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vital_sync::{CycleReport, DrainReport, EngineStatus, WakeResult};

/// Request sent from a `vitald` command to the daemon.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Status,
    /// Run a manual cycle.
    Sync,
    /// Emulate an OS background wake.
    Wake,
    Drain,
    Meal {
        at: DateTime<Utc>,
    },
    Login {
        access_token: String,
        refresh_token: String,
        user_id: String,
    },
    Logout,
    Shutdown,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::Status => "status",
            Request::Sync => "sync",
            Request::Wake => "wake",
            Request::Drain => "drain",
            Request::Meal { .. } => "meal",
            Request::Login { .. } => "login",
            Request::Logout => "logout",
            Request::Shutdown => "shutdown",
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Meal { at } => write!(f, "Meal {{ at: {at} }}"),
            Request::Login { user_id, .. } => write!(f, "Login {{ user_id: {user_id:?} }}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Response sent from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Status { status: DaemonStatus },
    Cycle { report: CycleReport },
    Wake { result: WakeResult },
    Drain { report: DrainReport },
    Meal { accepted: bool },
    Ok,
    ShuttingDown,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    pub pid: u32,
    pub version: String,
    pub uptime_secs: u64,
    /// False when the command ran in-process.
    pub daemon: bool,
    #[serde(flatten)]
    pub engine: EngineStatus,
}

/// Length-prefixed JSON framing.
///
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    /// Upper bound on a frame, so a bad length cannot stall the reader.
    pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

    pub async fn write_message<W, T>(writer: &mut W, message: &T) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
        T: Serialize,
    {
        let json = serde_json::to_vec(message)
            .map_err(|e| std::io::Error::other(format!("serialize error: {e}")))?;
        if json.len() > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {MAX_MESSAGE_SIZE})",
                json.len()
            )));
        }
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await
    }

    pub async fn read_message<R, T>(reader: &mut R) -> std::io::Result<T>
    where
        R: AsyncRead + Unpin,
        T: DeserializeOwned,
    {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {len} bytes (max {MAX_MESSAGE_SIZE})"
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {e}")))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
