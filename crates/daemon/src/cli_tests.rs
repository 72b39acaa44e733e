// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn run_defaults_to_background_logging() {
    let cli = Cli::try_parse_from(["vitald", "run"]).unwrap();
    assert!(matches!(cli.command, Command::Run { foreground: false }));
    assert_eq!(cli.state_dir, None);
}

#[test]
fn state_dir_is_global() {
    let cli =
        Cli::try_parse_from(["vitald", "status", "--state-dir", "/tmp/vs", "--json"]).unwrap();
    assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/vs")));
    assert!(cli.json);
}

#[test]
fn login_requires_all_credentials() {
    assert!(Cli::try_parse_from(["vitald", "login", "--access-token", "a"]).is_err());
    let cli = Cli::try_parse_from([
        "vitald",
        "login",
        "--access-token",
        "a",
        "--refresh-token",
        "r",
        "--user-id",
        "u",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::Login { .. }));
}

#[test]
fn meal_time_is_optional() {
    let cli = Cli::try_parse_from(["vitald", "meal"]).unwrap();
    assert!(matches!(cli.command, Command::Meal { at: None }));
}
