// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const QUICKSTART_HELP: &str = "\
Get started:
  vitald login --access-token A --refresh-token R --user-id U
  vitald run                 Start the daemon
  vitald sync                Sync today's data now
  vitald status              Show queue and session state";

#[derive(Parser)]
#[command(name = "vitald")]
#[command(version, about = "Syncs on-device health data to the vitalsync server")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// State directory (default: $XDG_STATE_HOME/vitalsync)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the sync daemon
    Run {
        /// Log to stderr instead of vitald.log
        #[arg(long)]
        foreground: bool,
    },
    /// Run a sync cycle now
    Sync,
    /// Emulate an OS background wake
    Wake,
    /// Deliver queued events
    Drain,
    /// Show engine state
    Status,
    /// Store session credentials
    Login {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
        #[arg(long)]
        user_id: String,
    },
    /// Forget session credentials
    Logout,
    /// Record a meal for the post-meal walk check
    Meal {
        /// Meal time in RFC 3339 (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Stop a running daemon
    Stop,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
