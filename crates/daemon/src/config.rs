// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Read from `config.toml` in the state directory. Every key is optional:
//!
//! ```toml
//! base_url = "https://api.example.com/v1"
//! signing_secret = "..."          # or VITALSYNC_SIGNING_SECRET
//! max_syncs_per_window = 10
//! sync_interval_mins = 30         # 0 disables the periodic trigger
//! utc_offset_minutes = 120        # fixed offset; defaults to the system zone
//! client_error_policy = "dead_letter"
//! health_export = "/path/to/health-export.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use vital_sync::{ClientErrorPolicy, LocalZone, SyncConfig, SyncError};

use crate::env;
use crate::error::{Error, Result};
use crate::export_store;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    signing_secret: Option<SecretString>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_syncs_per_window")]
    pub max_syncs_per_window: usize,
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,
    #[serde(default = "default_acquisition_retries")]
    pub acquisition_retries: u32,
    #[serde(default = "default_workout_lookback_hours")]
    pub workout_lookback_hours: u64,
    #[serde(default = "default_wake_budget_secs")]
    pub wake_budget_secs: u64,
    /// Minutes between periodic cycles. 0 disables the periodic trigger.
    #[serde(default = "default_sync_interval_mins")]
    pub sync_interval_mins: u64,
    /// Fixed offset from UTC. Unset follows the system time zone, daylight
    /// saving included.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub client_error_policy: ClientErrorPolicy,
    /// Health export file. Defaults to `health-export.json` in the state dir.
    #[serde(default)]
    pub health_export: Option<PathBuf>,
    #[serde(default = "default_export_poll_secs")]
    pub export_poll_secs: u64,
}

fn deserialize_secret<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

fn default_base_url() -> String {
    SyncConfig::default().base_url
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_syncs_per_window() -> usize {
    10
}

fn default_rate_window_secs() -> u64 {
    3600
}

fn default_acquisition_retries() -> u32 {
    2
}

fn default_workout_lookback_hours() -> u64 {
    24
}

fn default_wake_budget_secs() -> u64 {
    25
}

fn default_sync_interval_mins() -> u64 {
    30
}

fn default_export_poll_secs() -> u64 {
    60
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            base_url: default_base_url(),
            signing_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_syncs_per_window: default_max_syncs_per_window(),
            rate_window_secs: default_rate_window_secs(),
            acquisition_retries: default_acquisition_retries(),
            workout_lookback_hours: default_workout_lookback_hours(),
            wake_budget_secs: default_wake_budget_secs(),
            sync_interval_mins: default_sync_interval_mins(),
            utc_offset_minutes: None,
            client_error_policy: ClientErrorPolicy::default(),
            health_export: None,
            export_poll_secs: default_export_poll_secs(),
        }
    }
}

impl DaemonConfig {
    /// Loads `config.toml` from `state_dir`, then applies env overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = config_path(state_dir);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text).map_err(|reason| Error::Config {
                path: path.clone(),
                reason,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DaemonConfig::default(),
            Err(e) => return Err(e.into()),
        };
        config.apply_env();
        Ok(config)
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }

    /// Environment values win over the file.
    fn apply_env(&mut self) {
        if let Some(url) = env::base_url() {
            self.base_url = url;
        }
        if let Some(secret) = env::signing_secret() {
            self.signing_secret = Some(secret);
        }
    }

    /// Engine settings, validated.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        let local_zone = match self.utc_offset_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(LocalZone::Fixed)
                .ok_or_else(|| {
                    SyncError::Config(format!("utc_offset_minutes out of range: {minutes}"))
                })?,
            None => LocalZone::System,
        };
        let config = SyncConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_syncs_per_window: self.max_syncs_per_window,
            rate_window: Duration::from_secs(self.rate_window_secs),
            acquisition_retries: self.acquisition_retries,
            workout_lookback: Duration::from_secs(self.workout_lookback_hours.saturating_mul(3600)),
            wake_budget: Duration::from_secs(self.wake_budget_secs),
            sync_interval: (self.sync_interval_mins > 0)
                .then(|| Duration::from_secs(self.sync_interval_mins.saturating_mul(60))),
            local_zone,
            client_error_policy: self.client_error_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// The HMAC secret. There is no built-in fallback.
    pub fn signing_secret(&self, state_dir: &Path) -> Result<&SecretString> {
        self.signing_secret
            .as_ref()
            .ok_or_else(|| Error::MissingSecret(config_path(state_dir)))
    }

    /// Health export file, resolved against `state_dir`.
    pub fn health_export_path(&self, state_dir: &Path) -> PathBuf {
        match &self.health_export {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => state_dir.join(path),
            None => state_dir.join(export_store::FILE_NAME),
        }
    }

    pub fn export_poll_interval(&self) -> Option<Duration> {
        (self.export_poll_secs > 0).then(|| Duration::from_secs(self.export_poll_secs))
    }
}

pub fn config_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
