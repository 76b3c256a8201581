// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use jm_core::{MatchLogEntry, MatchSession};
use jm_engine::MatchSummary;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items, or `empty` when there are none in text mode
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// Full session view for `jm status`
#[derive(Serialize)]
#[serde(transparent)]
pub struct SessionDetail<'a>(pub &'a MatchSession);

impl fmt::Display for SessionDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f, "Session: {}", s.id)?;
        writeln!(f, "  Status: {}", s.status.as_str())?;
        writeln!(f, "  Trigger: {}", s.trigger_source)?;
        if let Some(company) = &s.company_id {
            writeln!(f, "  Company: {}", company)?;
        }
        writeln!(f, "  Jobs: {}/{}", s.jobs_completed, s.jobs_total)?;
        writeln!(f, "  Succeeded: {}", s.jobs_succeeded)?;
        writeln!(f, "  Failed: {}", s.jobs_failed)?;
        writeln!(f, "  Errors: {}", s.error_count)?;
        if let Some(started) = s.started_at {
            writeln!(f, "  Started: {}", started.to_rfc3339())?;
        }
        if let Some(completed) = s.completed_at {
            write!(f, "  Completed: {}", completed.to_rfc3339())?;
        }
        Ok(())
    }
}

/// One line per session for `jm sessions`
#[derive(Serialize)]
#[serde(transparent)]
pub struct SessionRow<'a>(pub &'a MatchSession);

impl fmt::Display for SessionRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "{:<38} {:<10} {:<16} {}/{} ok={} failed={}",
            s.id,
            s.status.as_str(),
            s.trigger_source,
            s.jobs_completed,
            s.jobs_total,
            s.jobs_succeeded,
            s.jobs_failed
        )
    }
}

/// One line per processed job for `jm logs`
#[derive(Serialize)]
#[serde(transparent)]
pub struct LogRow<'a>(pub &'a MatchLogEntry);

impl fmt::Display for LogRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        write!(f, "{:<24} ", e.job_id)?;
        match (e.score, e.error_type) {
            (Some(score), _) => write!(f, "score={:<5}", score)?,
            (None, Some(kind)) => write!(f, "{:<11}", kind.as_str())?,
            (None, None) => write!(f, "{:<11}", "-")?,
        }
        write!(f, " attempts={} {}ms", e.attempt_count, e.duration_ms)?;
        if let Some(message) = &e.error_message {
            write!(f, " {}", message)?;
        }
        Ok(())
    }
}

/// Result of `jm run`
#[derive(Serialize)]
#[serde(transparent)]
pub struct SummaryView<'a>(pub &'a MatchSummary);

impl fmt::Display for SummaryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "Session {}: {} succeeded, {} failed of {}",
            s.session_id, s.succeeded, s.failed, s.total
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
