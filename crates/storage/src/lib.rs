// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Persistence for match sessions, log entries, jobs and the candidate profile

mod json;
#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use json::JsonStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

use jm_core::{CandidateProfile, Job, JobId, JobMatch, MatchLogEntry, MatchSession, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {kind}/{id}")]
    NotFound { kind: &'static str, id: String },
    #[error("already exists: {kind}/{id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Session and log persistence
///
/// `modify_session` is the only way to change a stored session. It runs the
/// closure and persists the result in one critical section, and persists
/// nothing when the closure returns `false`. Conditional transitions such as
/// "finalize if still active" are built on it.
pub trait MatchStore: Clone + Send + Sync + 'static {
    fn create_session(&self, session: &MatchSession) -> Result<(), StoreError>;

    fn get_session(&self, id: &SessionId) -> Result<Option<MatchSession>, StoreError>;

    /// Most recently started first
    fn list_sessions(&self) -> Result<Vec<MatchSession>, StoreError>;

    /// Atomically mutate a session; returns whether the change was applied
    fn modify_session(
        &self,
        id: &SessionId,
        change: &mut dyn FnMut(&mut MatchSession) -> bool,
    ) -> Result<bool, StoreError>;

    fn append_log(&self, entry: &MatchLogEntry) -> Result<(), StoreError>;

    fn session_logs(&self, id: &SessionId) -> Result<Vec<MatchLogEntry>, StoreError>;
}

/// Job postings and their match fields
pub trait JobStore: Clone + Send + Sync + 'static {
    fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError>;

    fn save_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Write match fields onto an existing job
    fn save_match(&self, id: &JobId, result: &JobMatch) -> Result<(), StoreError>;

    /// Ids of jobs without match fields, in id order
    fn unmatched_job_ids(&self) -> Result<Vec<JobId>, StoreError>;
}

/// Source of the candidate profile
pub trait ProfileSource: Clone + Send + Sync + 'static {
    fn load_profile(&self) -> Result<Option<CandidateProfile>, StoreError>;
}

fn sort_sessions(sessions: &mut [MatchSession]) {
    sessions.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
