// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon tests.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use vital_core::SystemClock;
use vital_sync::{
    BoxFuture, EngineDeps, HttpClient, HttpError, HttpRequest, HttpResponse, RequestSigner,
    SyncConfig, SyncEngine,
};

use crate::export_store::{self, ExportFileStore};

/// Export with a little activity, all in the past.
pub const EXPORT: &str = r#"{
  "quantities": [
    {"kind": "step_count", "start": "2020-01-01T08:00:00Z", "end": "2020-01-01T09:00:00Z", "value": 800}
  ]
}"#;

/// Accepts every request and records its URL.
#[derive(Clone, Default)]
pub struct AcceptAll {
    pub urls: Arc<Mutex<Vec<String>>>,
}

impl HttpClient for AcceptAll {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
        self.urls.lock().unwrap().push(request.url);
        Box::pin(async {
            Ok(HttpResponse {
                status: 200,
                body: Vec::new(),
            })
        })
    }
}

/// Engine over `state_dir` with an export file and an accepting server.
pub async fn engine(state_dir: &Path, http: AcceptAll) -> Arc<SyncEngine> {
    let export = state_dir.join(export_store::FILE_NAME);
    std::fs::write(&export, EXPORT).unwrap();
    let config = SyncConfig {
        base_url: "https://api.test".into(),
        ..SyncConfig::default()
    };
    let engine = SyncEngine::open(
        config,
        state_dir,
        EngineDeps {
            http: Arc::new(http),
            health: Arc::new(ExportFileStore::new(&export, None)),
            signer: RequestSigner::new(&SecretString::from("test-secret".to_string())).unwrap(),
            clock: Arc::new(SystemClock),
        },
    )
    .await
    .unwrap();
    Arc::new(engine)
}

/// Writes a config that points the engine at an unreachable server.
pub fn write_offline_config(state_dir: &Path) {
    std::fs::create_dir_all(state_dir).unwrap();
    std::fs::write(
        crate::config::config_path(state_dir),
        "base_url = \"http://127.0.0.1:9\"\nsigning_secret = \"test-secret\"\nrequest_timeout_secs = 2\n",
    )
    .unwrap();
    std::fs::write(state_dir.join(export_store::FILE_NAME), EXPORT).unwrap();
}
