// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Match session state machine and per-job log records
//!
//! A session is one batch invocation. Status only moves forward:
//!
//! ```text
//! pending -> in_progress -> completed
//!                        \-> failed
//! ```
//!
//! A stop request may move any active session straight to `failed`. Once a
//! session is terminal every further mutation is refused, which is what lets
//! a stop win over a late finalization.

use crate::error::ErrorKind;
use crate::id::SessionId;
use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What started a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Manual,
    Scheduler,
    CompanyRefresh,
    MatchUnmatched,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Manual => "manual",
            TriggerSource::Scheduler => "scheduler",
            TriggerSource::CompanyRefresh => "company_refresh",
            TriggerSource::MatchUnmatched => "match_unmatched",
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub jobs_completed: u32,
    pub jobs_succeeded: u32,
    pub jobs_failed: u32,
    /// Failed provider attempts, including ones later retried successfully
    pub error_count: u32,
}

impl SessionCounters {
    pub fn from_totals(succeeded: u32, failed: u32, error_count: u32) -> Self {
        Self {
            jobs_completed: succeeded + failed,
            jobs_succeeded: succeeded,
            jobs_failed: failed,
            error_count,
        }
    }

    /// Whether these totals predate `other`
    pub fn is_behind(&self, other: &SessionCounters) -> bool {
        self.jobs_completed < other.jobs_completed || self.error_count < other.error_count
    }
}

/// Persisted record of one batch invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSession {
    pub id: SessionId,
    pub trigger_source: TriggerSource,
    pub company_id: Option<String>,
    pub status: SessionStatus,
    pub jobs_total: u32,
    pub jobs_completed: u32,
    pub jobs_succeeded: u32,
    pub jobs_failed: u32,
    pub error_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchSession {
    pub fn new(
        id: SessionId,
        trigger_source: TriggerSource,
        company_id: Option<String>,
        jobs_total: u32,
    ) -> Self {
        Self {
            id,
            trigger_source,
            company_id,
            status: SessionStatus::Pending,
            jobs_total,
            jobs_completed: 0,
            jobs_succeeded: 0,
            jobs_failed: 0,
            error_count: 0,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn counters(&self) -> SessionCounters {
        SessionCounters {
            jobs_completed: self.jobs_completed,
            jobs_succeeded: self.jobs_succeeded,
            jobs_failed: self.jobs_failed,
            error_count: self.error_count,
        }
    }

    /// pending -> in_progress. Already in progress is accepted as-is.
    pub fn begin(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            SessionStatus::Pending => {
                self.status = SessionStatus::InProgress;
                self.started_at = Some(now);
                true
            }
            SessionStatus::InProgress => true,
            SessionStatus::Completed | SessionStatus::Failed => false,
        }
    }

    /// Overwrite the running totals of an active session
    ///
    /// Totals older than the stored ones are ignored.
    pub fn apply_counters(&mut self, counters: SessionCounters) -> bool {
        if self.status.is_terminal() || counters.is_behind(&self.counters()) {
            return false;
        }
        self.set_counters(counters);
        true
    }

    /// Terminal transition with the final totals
    ///
    /// The session ends `failed` only when every processed job failed.
    pub fn finalize(&mut self, counters: SessionCounters, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.set_counters(counters);
        self.status = if counters.jobs_failed > 0 && counters.jobs_succeeded == 0 {
            SessionStatus::Failed
        } else {
            SessionStatus::Completed
        };
        self.started_at.get_or_insert(now);
        self.completed_at = Some(now);
        true
    }

    /// Externally requested stop: `failed`, keeping the totals seen so far
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        self.fail(now)
    }

    /// Session-level failure: `failed`, keeping the totals seen so far
    pub fn fail(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Failed;
        self.jobs_completed = self.jobs_succeeded + self.jobs_failed;
        self.completed_at = Some(now);
        true
    }

    fn set_counters(&mut self, counters: SessionCounters) {
        self.jobs_succeeded = counters.jobs_succeeded;
        self.jobs_failed = counters.jobs_failed;
        self.jobs_completed = counters.jobs_succeeded + counters.jobs_failed;
        self.error_count = counters.error_count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Succeeded,
    Failed,
}

/// Immutable audit record of one job processed in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLogEntry {
    pub session_id: SessionId,
    pub job_id: JobId,
    pub status: LogStatus,
    pub score: Option<f64>,
    pub attempt_count: u32,
    pub error_type: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub model_used: String,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
