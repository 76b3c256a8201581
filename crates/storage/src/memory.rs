// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for tests

use crate::{sort_sessions, JobStore, MatchStore, ProfileSource, StoreError};
use jm_core::{CandidateProfile, Job, JobId, JobMatch, MatchLogEntry, MatchSession, SessionId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<SessionId, MatchSession>,
    logs: HashMap<SessionId, Vec<MatchLogEntry>>,
    jobs: BTreeMap<JobId, Job>,
    profile: Option<CandidateProfile>,
    fail_log_writes: bool,
    fail_match_writes: bool,
}

/// Thread-safe store backed by maps, with write-failure injection
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: CandidateProfile) -> Self {
        self.lock().profile = Some(profile);
        self
    }

    pub fn with_jobs(self, jobs: impl IntoIterator<Item = Job>) -> Self {
        {
            let mut state = self.lock();
            for job in jobs {
                state.jobs.insert(job.id.clone(), job);
            }
        }
        self
    }

    /// Make `append_log` fail
    pub fn fail_log_writes(&self, fail: bool) {
        self.lock().fail_log_writes = fail;
    }

    /// Make `save_match` fail
    pub fn fail_match_writes(&self, fail: bool) {
        self.lock().fail_match_writes = fail;
    }

    /// All log entries, across sessions
    pub fn all_logs(&self) -> Vec<MatchLogEntry> {
        let state = self.lock();
        state.logs.values().flatten().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MatchStore for MemoryStore {
    fn create_session(&self, session: &MatchSession) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.sessions.contains_key(&session.id) {
            return Err(StoreError::AlreadyExists {
                kind: "session",
                id: session.id.0.clone(),
            });
        }
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<MatchSession>, StoreError> {
        Ok(self.lock().sessions.get(id).cloned())
    }

    fn list_sessions(&self) -> Result<Vec<MatchSession>, StoreError> {
        let mut sessions: Vec<_> = self.lock().sessions.values().cloned().collect();
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    fn modify_session(
        &self,
        id: &SessionId,
        change: &mut dyn FnMut(&mut MatchSession) -> bool,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        let Some(stored) = state.sessions.get_mut(id) else {
            return Err(StoreError::NotFound {
                kind: "session",
                id: id.0.clone(),
            });
        };
        let mut draft = stored.clone();
        if !change(&mut draft) {
            return Ok(false);
        }
        *stored = draft;
        Ok(true)
    }

    fn append_log(&self, entry: &MatchLogEntry) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_log_writes {
            return Err(StoreError::Unavailable("log writes disabled".to_string()));
        }
        state
            .logs
            .entry(entry.session_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    fn session_logs(&self, id: &SessionId) -> Result<Vec<MatchLogEntry>, StoreError> {
        Ok(self.lock().logs.get(id).cloned().unwrap_or_default())
    }
}

impl JobStore for MemoryStore {
    fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.lock().jobs.get(id).cloned())
    }

    fn save_job(&self, job: &Job) -> Result<(), StoreError> {
        self.lock().jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn save_match(&self, id: &JobId, result: &JobMatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_match_writes {
            return Err(StoreError::Unavailable("match writes disabled".to_string()));
        }
        let Some(job) = state.jobs.get_mut(id) else {
            return Err(StoreError::NotFound {
                kind: "job",
                id: id.0.clone(),
            });
        };
        job.matched = Some(result.clone());
        Ok(())
    }

    fn unmatched_job_ids(&self) -> Result<Vec<JobId>, StoreError> {
        Ok(self
            .lock()
            .jobs
            .values()
            .filter(|job| !job.is_matched())
            .map(|job| job.id.clone())
            .collect())
    }
}

impl ProfileSource for MemoryStore {
    fn load_profile(&self) -> Result<Option<CandidateProfile>, StoreError> {
        Ok(self.lock().profile.clone())
    }
}
