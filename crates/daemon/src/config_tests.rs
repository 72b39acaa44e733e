// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::env::names;
use crate::env::tests::{EnvGuard, ENV_LOCK};
use secrecy::ExposeSecret;
use tempfile::TempDir;

fn clean_env() -> (EnvGuard, EnvGuard) {
    (
        EnvGuard::remove(names::VITALSYNC_BASE_URL),
        EnvGuard::remove(names::VITALSYNC_SIGNING_SECRET),
    )
}

#[test]
fn missing_file_uses_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _env = clean_env();
    let temp = TempDir::new().unwrap();

    let config = DaemonConfig::load(temp.path()).unwrap();
    assert_eq!(config.base_url, "http://localhost:8000");
    assert_eq!(config.max_syncs_per_window, 10);
    assert_eq!(config.sync_interval_mins, 30);
    assert!(config.signing_secret(temp.path()).is_err());
    assert_eq!(config.sync_config().unwrap().local_zone, LocalZone::System);
}

#[test]
fn file_values_override_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _env = clean_env();
    let temp = TempDir::new().unwrap();
    std::fs::write(
        config_path(temp.path()),
        r#"
base_url = "https://api.example.com/v1"
signing_secret = "from-file"
max_syncs_per_window = 4
sync_interval_mins = 0
utc_offset_minutes = -300
client_error_policy = "retain"
"#,
    )
    .unwrap();

    let config = DaemonConfig::load(temp.path()).unwrap();
    let sync = config.sync_config().unwrap();
    assert_eq!(sync.base_url, "https://api.example.com/v1");
    assert_eq!(sync.max_syncs_per_window, 4);
    assert_eq!(sync.sync_interval, None);
    assert_eq!(
        sync.local_zone,
        LocalZone::Fixed(chrono::FixedOffset::west_opt(300 * 60).unwrap())
    );
    assert_eq!(sync.client_error_policy, ClientErrorPolicy::Retain);
    assert_eq!(
        config.signing_secret(temp.path()).unwrap().expose_secret(),
        "from-file"
    );
}

#[test]
fn env_overrides_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _url = EnvGuard::set(names::VITALSYNC_BASE_URL, "https://env.example.com");
    let _secret = EnvGuard::set(names::VITALSYNC_SIGNING_SECRET, "from-env");
    let temp = TempDir::new().unwrap();
    std::fs::write(
        config_path(temp.path()),
        "base_url = \"https://file.example.com\"\nsigning_secret = \"from-file\"\n",
    )
    .unwrap();

    let config = DaemonConfig::load(temp.path()).unwrap();
    assert_eq!(config.base_url, "https://env.example.com");
    assert_eq!(
        config.signing_secret(temp.path()).unwrap().expose_secret(),
        "from-env"
    );
}

#[test]
fn malformed_file_names_the_path() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _env = clean_env();
    let temp = TempDir::new().unwrap();
    std::fs::write(config_path(temp.path()), "max_syncs_per_window = \"many\"").unwrap();

    let err = DaemonConfig::load(temp.path()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn invalid_values_are_rejected() {
    let config = DaemonConfig {
        base_url: "ftp://nope".into(),
        ..DaemonConfig::default()
    };
    assert!(config.sync_config().is_err());

    let config = DaemonConfig {
        max_syncs_per_window: 0,
        ..DaemonConfig::default()
    };
    assert!(config.sync_config().is_err());

    let config = DaemonConfig {
        utc_offset_minutes: Some(24 * 60),
        ..DaemonConfig::default()
    };
    assert!(config.sync_config().is_err());
}

#[test]
fn debug_output_hides_secret() {
    let config: DaemonConfig = toml::from_str("signing_secret = \"hunter2\"").unwrap();
    assert!(!format!("{config:?}").contains("hunter2"));
}

#[test]
fn export_path_resolution() {
    let state = Path::new("/var/state");
    let mut config = DaemonConfig::default();
    assert_eq!(
        config.health_export_path(state),
        PathBuf::from("/var/state/health-export.json")
    );

    config.health_export = Some(PathBuf::from("exports/today.json"));
    assert_eq!(
        config.health_export_path(state),
        PathBuf::from("/var/state/exports/today.json")
    );

    config.health_export = Some(PathBuf::from("/data/export.json"));
    assert_eq!(
        config.health_export_path(state),
        PathBuf::from("/data/export.json")
    );
}
