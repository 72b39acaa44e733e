// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable rendering of control responses.

use vital_ipc::{DaemonStatus, Response};
use vital_sync::{CycleOutcome, CycleReport, DrainReport, LastReading};

pub fn render(response: &Response) -> String {
    match response {
        Response::Pong => "pong".to_string(),
        Response::Status { status } => render_status(status),
        Response::Cycle { report } => render_cycle(report),
        Response::Wake { result } => format!("wake: {result}"),
        Response::Drain { report } => render_drain(report),
        Response::Meal { accepted: true } => "meal recorded".to_string(),
        Response::Meal { accepted: false } => {
            "meal ignored: a later meal is already recorded".to_string()
        }
        Response::Ok => "ok".to_string(),
        Response::ShuttingDown => "vitald stopping".to_string(),
        Response::Error { message } => format!("error: {message}"),
    }
}

fn render_status(status: &DaemonStatus) -> String {
    let engine = &status.engine;
    let mut lines = Vec::new();
    if status.daemon {
        lines.push(format!(
            "daemon:          running (pid {}, up {}s)",
            status.pid, status.uptime_secs
        ));
    } else {
        lines.push("daemon:          not running".to_string());
    }
    lines.push(format!(
        "user:            {}",
        engine.user_id.as_deref().unwrap_or("(logged out)")
    ));
    lines.push(format!("pending events:  {}", engine.pending_events));
    lines.push(format!("dead letters:    {}", engine.dead_letters));
    lines.push(format!("syncs remaining: {}", engine.syncs_remaining));
    lines.push(format!(
        "last meal:       {}",
        engine
            .last_meal
            .map_or_else(|| "none".to_string(), |t| t.to_rfc3339())
    ));
    lines.push(format!(
        "health access:   {}",
        if engine.health_access_denied {
            "denied"
        } else {
            "ok"
        }
    ));
    lines.push(format!(
        "last vitals:     {}",
        engine
            .last_vitals
            .as_ref()
            .map_or_else(|| "none".to_string(), describe_vitals)
    ));
    lines.push(format!(
        "last summary:    {}",
        engine
            .last_summary
            .as_ref()
            .map_or_else(|| "none".to_string(), describe_summary)
    ));
    lines.join("\n")
}

fn describe_vitals(reading: &LastReading) -> String {
    let payload = &reading.payload;
    let steps = payload.get("steps").and_then(|v| v.as_u64()).unwrap_or(0);
    let sleep = payload.get("sleepHours").and_then(|v| v.as_f64()).unwrap_or(0.0);
    format!(
        "{steps} steps, {sleep:.1}h sleep ({})",
        reading.acquired_at.to_rfc3339()
    )
}

fn describe_summary(reading: &LastReading) -> String {
    let date = reading.payload.get("date").and_then(|v| v.as_str()).unwrap_or("?");
    format!("{date} ({})", reading.acquired_at.to_rfc3339())
}

fn render_cycle(report: &CycleReport) -> String {
    let mut text = match &report.outcome {
        CycleOutcome::Gated => "sync skipped: rate limit reached".to_string(),
        CycleOutcome::Unavailable { reason } => format!("sync skipped: {reason}"),
        CycleOutcome::Failed { reason } => format!("sync failed: {reason}"),
        CycleOutcome::Delivered(counts) => {
            let mut text = format!(
                "sync: {} delivered, {} queued",
                counts.delivered, counts.queued
            );
            if counts.dead_lettered > 0 {
                text.push_str(&format!(", {} dead-lettered", counts.dead_lettered));
            }
            if counts.store_errors > 0 {
                text.push_str(&format!(", {} lost to storage errors", counts.store_errors));
            }
            text
        }
    };
    if let Some(walk) = report.post_meal_walk {
        text.push_str(&format!("\npost-meal walk: {walk}"));
    }
    text
}

fn render_drain(report: &DrainReport) -> String {
    format!(
        "drain {}: {} delivered, {} dead-lettered, {} remaining",
        report.status, report.delivered, report.dead_lettered, report.remaining
    )
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
