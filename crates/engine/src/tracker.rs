// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session bookkeeping and live progress
//!
//! Every write to a session after creation is conditional on the session
//! still being active. A stop request is itself such a write, so whichever
//! of "stop" and "finalize" lands first wins and the other is refused.

use crate::error::TrackerError;
use crate::strategy::JobOutcome;
use jm_core::{
    Clock, ErrorKind, IdGen, Job, JobId, LogStatus, MatchLogEntry, MatchSession, SessionCounters,
    SessionId, TriggerSource,
};
use jm_storage::MatchStore;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Creates, updates and finalizes persisted sessions
#[derive(Clone)]
pub struct SessionTracker<St, C, I> {
    store: St,
    clock: C,
    id_gen: I,
}

impl<St, C, I> SessionTracker<St, C, I>
where
    St: MatchStore,
    C: Clock,
    I: IdGen,
{
    pub fn new(store: St, clock: C, id_gen: I) -> Self {
        Self {
            store,
            clock,
            id_gen,
        }
    }

    /// Persist a new session for `job_ids` and move it to `in_progress`
    pub fn create_match_session(
        &self,
        job_ids: &[JobId],
        trigger: TriggerSource,
        company_id: Option<String>,
    ) -> Result<SessionId, TrackerError> {
        let id = self.id_gen.next_session_id();
        let distinct: HashSet<&JobId> = job_ids.iter().collect();
        let total = u32::try_from(distinct.len()).unwrap_or(u32::MAX);
        let mut session = MatchSession::new(id.clone(), trigger, company_id, total);
        session.begin(self.clock.utc_now());
        self.store.create_session(&session)?;
        tracing::info!(
            session_id = %id,
            trigger = %trigger,
            jobs_total = session.jobs_total,
            "match session created"
        );
        Ok(id)
    }

    /// Load an existing session, starting it if still pending
    ///
    /// A terminal session is returned unchanged.
    pub fn attach(&self, id: &SessionId) -> Result<MatchSession, TrackerError> {
        let now = self.clock.utc_now();
        match self.store.modify_session(id, &mut |s| s.status.is_active() && s.begin(now)) {
            Ok(_) => {}
            Err(jm_storage::StoreError::NotFound { .. }) => {
                return Err(TrackerError::SessionNotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        }
        self.store
            .get_session(id)?
            .ok_or_else(|| TrackerError::SessionNotFound(id.clone()))
    }

    /// Overwrite running totals unless the session already ended or holds
    /// newer ones
    pub fn update_if_active(
        &self,
        id: &SessionId,
        counters: SessionCounters,
    ) -> Result<bool, TrackerError> {
        Ok(self
            .store
            .modify_session(id, &mut |s| s.apply_counters(counters))?)
    }

    /// Terminal transition with final totals, unless a stop got there first
    pub fn finalize(&self, id: &SessionId, counters: SessionCounters) -> Result<bool, TrackerError> {
        let now = self.clock.utc_now();
        let applied = self
            .store
            .modify_session(id, &mut |s| s.finalize(counters, now))?;
        if applied {
            tracing::info!(
                session_id = %id,
                succeeded = counters.jobs_succeeded,
                failed = counters.jobs_failed,
                errors = counters.error_count,
                "match session finalized"
            );
        } else {
            tracing::info!(session_id = %id, "session already ended, keeping recorded totals");
        }
        Ok(applied)
    }

    /// Stop an active session; `false` when it had already ended
    pub fn stop_session(&self, id: &SessionId) -> Result<bool, TrackerError> {
        let now = self.clock.utc_now();
        let applied = match self.store.modify_session(id, &mut |s| s.stop(now)) {
            Ok(applied) => applied,
            Err(jm_storage::StoreError::NotFound { .. }) => {
                return Err(TrackerError::SessionNotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        if applied {
            tracing::info!(session_id = %id, "match session stopped");
        }
        Ok(applied)
    }

    /// Mark the session failed after a session-level error
    pub fn fail_session(&self, id: &SessionId) -> Result<bool, TrackerError> {
        let now = self.clock.utc_now();
        Ok(self.store.modify_session(id, &mut |s| s.fail(now))?)
    }

    /// Whether work for this session should halt
    ///
    /// A read failure does not stop the batch.
    pub fn should_stop(&self, id: &SessionId) -> bool {
        match self.store.get_session(id) {
            Ok(Some(session)) => session.status.is_terminal(),
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "stop check failed");
                false
            }
        }
    }

    pub fn get_status(&self, id: &SessionId) -> Result<Option<MatchSession>, TrackerError> {
        Ok(self.store.get_session(id)?)
    }

    pub fn record_log(&self, entry: &MatchLogEntry) -> Result<(), TrackerError> {
        Ok(self.store.append_log(entry)?)
    }

    /// Build the log entry for one processed job
    pub fn log_entry(
        &self,
        session_id: &SessionId,
        job_id: &JobId,
        outcome: &JobOutcome,
        model: &str,
    ) -> MatchLogEntry {
        let (status, score, error_type, error_message) = match outcome {
            JobOutcome::Succeeded { result, .. } => {
                (LogStatus::Succeeded, Some(result.score), None, None)
            }
            JobOutcome::Failed { error, .. } => (
                LogStatus::Failed,
                None,
                Some(error.kind),
                Some(error.message.clone()),
            ),
        };
        MatchLogEntry {
            session_id: session_id.clone(),
            job_id: job_id.clone(),
            status,
            score,
            attempt_count: outcome.attempts(),
            error_type,
            error_message,
            duration_ms: u64::try_from(outcome.duration().as_millis()).unwrap_or(u64::MAX),
            model_used: model.to_string(),
            completed_at: self.clock.utc_now(),
        }
    }

    pub fn create_progress_tracker(&self, id: &SessionId) -> ProgressTracker {
        ProgressTracker::new(id.clone())
    }
}

/// Outcome for a requested job that is not in the job store
pub(crate) fn missing_job_outcome(job_id: &JobId) -> JobOutcome {
    JobOutcome::failed(
        jm_core::MatchError::new(ErrorKind::Validation, format!("job not found: {}", job_id)),
        std::time::Duration::ZERO,
    )
}

/// Stand-in job used when logging a job that could not be loaded
pub(crate) fn placeholder_job(job_id: &JobId) -> Job {
    Job::new(job_id.clone(), String::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Preparing,
    Matching,
    Finalizing,
    Done,
}

/// Point-in-time progress of a running batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub session_id: SessionId,
    pub phase: ProgressPhase,
    pub stats: SessionCounters,
    pub queue_position: usize,
    pub complete: bool,
}

/// Live progress for pollers; nothing depends on it for correctness
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressSnapshot>>,
}

impl ProgressTracker {
    fn new(session_id: SessionId) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ProgressSnapshot {
                session_id,
                phase: ProgressPhase::Preparing,
                stats: SessionCounters::default(),
                queue_position: 0,
                complete: false,
            })),
        }
    }

    pub fn set_phase(&self, phase: ProgressPhase) {
        let mut inner = self.lock();
        tracing::debug!(session_id = %inner.session_id, ?phase, "phase");
        inner.phase = phase;
    }

    pub fn set_stats(&self, stats: SessionCounters) {
        let mut inner = self.lock();
        tracing::debug!(
            session_id = %inner.session_id,
            completed = stats.jobs_completed,
            succeeded = stats.jobs_succeeded,
            failed = stats.jobs_failed,
            "progress"
        );
        if !stats.is_behind(&inner.stats) {
            inner.stats = stats;
        }
    }

    pub fn set_queue_position(&self, position: usize) {
        self.lock().queue_position = position;
    }

    pub fn complete(&self) {
        let mut inner = self.lock();
        inner.phase = ProgressPhase::Done;
        inner.queue_position = 0;
        inner.complete = true;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressSnapshot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
