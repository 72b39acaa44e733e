// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Generates `env_names.rs`, the environment variable names vitald reads.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const VARS: &[(&str, &str)] = &[
    ("VITALSYNC_STATE_DIR", "Override the vitald state directory."),
    ("VITALSYNC_BASE_URL", "Override the sync server base URL."),
    (
        "VITALSYNC_SIGNING_SECRET",
        "HMAC secret shared with the sync server.",
    ),
    ("XDG_STATE_HOME", "XDG base directory for state data."),
    (
        "RUST_LOG",
        "Log level filtering (used by tracing-subscriber).",
    ),
];

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cargo:warning=OUT_DIR not set: {e}");
            std::process::exit(1);
        }
    };

    let mut contents = String::new();
    for (name, doc) in VARS {
        let _ = writeln!(contents, "/// Environment variable: {doc}");
        let _ = writeln!(contents, "pub const {name}: &str = \"{name}\";\n");
    }

    let dest_path = Path::new(&out_dir).join("env_names.rs");
    if let Err(e) = fs::write(&dest_path, contents) {
        eprintln!("cargo:warning=failed to write env_names.rs: {e}");
        std::process::exit(1);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
