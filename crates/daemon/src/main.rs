// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vitald - the vitalsync daemon.
//!
//! Hosts the sync engine against a state directory (default
//! `~/.local/state/vitalsync/`). `vitald run` keeps the engine alive with
//! its timers and a control socket; the other subcommands talk to that
//! socket, or run in-process when no daemon is up.

use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Parser;

mod cli;
mod commands;
mod config;
mod control;
mod daemon;
mod env;
mod error;
mod export_store;
mod output;
mod paths;
#[cfg(test)]
mod test_support;

use cli::{Cli, Command};
use error::{Error, Result};
use paths::Paths;
use vital_ipc::Request;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let paths = Paths::new(&paths::resolve_state_dir(cli.state_dir.clone()));

    match &cli.command {
        Command::Run { foreground: false } => setup_logging(Some(&paths.log), "info"),
        Command::Run { foreground: true } => setup_logging(None, "info"),
        _ => setup_logging(None, "warn"),
    }

    let code = match dispatch(cli, &paths).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli, paths: &Paths) -> Result<()> {
    let request = match cli.command {
        Command::Run { .. } => return daemon::run(paths).await,
        Command::Sync => Request::Sync,
        Command::Wake => Request::Wake,
        Command::Drain => Request::Drain,
        Command::Status => Request::Status,
        Command::Login {
            access_token,
            refresh_token,
            user_id,
        } => Request::Login {
            access_token,
            refresh_token,
            user_id,
        },
        Command::Logout => Request::Logout,
        Command::Meal { at } => Request::Meal {
            at: parse_meal_time(at.as_deref())?,
        },
        Command::Stop => Request::Shutdown,
    };

    let response = commands::execute(paths, request).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", output::render(&response));
    }
    Ok(())
}

fn parse_meal_time(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        None => Ok(Utc::now()),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| Error::InvalidTime(text.to_string())),
    }
}

fn setup_logging(log_path: Option<&Path>, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = log_path.and_then(|path| {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    // Fall back to stderr when the log file cannot be opened.
    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
