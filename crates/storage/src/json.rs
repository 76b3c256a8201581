// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based storage
//!
//! Layout under the base directory:
//!
//! ```text
//! sessions/<session-id>.json    one document per session
//! logs/<session-id>.jsonl       append-only log entries
//! jobs/<job-id>.json            one document per job
//! profile.json                  candidate profile
//! store.lock                    held while a document is rewritten
//! ```

use crate::{sort_sessions, JobStore, MatchStore, ProfileSource, StoreError};
use jm_core::{CandidateProfile, Job, JobId, JobMatch, MatchLogEntry, MatchSession, SessionId};
use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const SESSIONS: &str = "sessions";
const LOGS: &str = "logs";
const JOBS: &str = "jobs";
const LOCK_FILE: &str = "store.lock";

/// JSON file-based storage
///
/// Clones share one lock, so read-modify-write cycles from concurrent tasks
/// of the same process never interleave. Rewrites additionally hold an
/// exclusive lock on `store.lock`, which serializes them against other
/// handles and other processes using the same directory.
#[derive(Clone)]
pub struct JsonStore {
    base_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonStore {
    /// Open a store at the given path
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        for kind in [SESSIONS, LOGS, JOBS] {
            fs::create_dir_all(base_path.join(kind))?;
        }
        tracing::debug!(path = %base_path.display(), "opened json store");
        Ok(Self {
            base_path,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn profile_path(&self) -> PathBuf {
        self.base_path.join("profile.json")
    }

    pub fn save_profile(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        write_json(&self.profile_path(), profile)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Take the in-process lock, then block on the directory lock file
    fn write_guard(&self) -> Result<WriteGuard<'_>, StoreError> {
        let local = self.guard();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(WriteGuard {
            file,
            _local: local,
        })
    }

    fn path_for(&self, kind: &str, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.base_path.join(kind).join(format!("{}.json", id)))
    }

    fn load<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<Option<T>, StoreError> {
        read_json(&self.path_for(kind, id)?)
    }

    fn list<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, StoreError> {
        let mut items = Vec::new();
        for entry in fs::read_dir(self.base_path.join(kind))? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(item) = read_json(&path)? {
                    items.push(item);
                }
            }
        }
        Ok(items)
    }
}

/// Releases the directory lock before the in-process one
struct WriteGuard<'a> {
    file: File,
    _local: std::sync::MutexGuard<'a, ()>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, "failed to release store lock");
        }
    }
}

impl MatchStore for JsonStore {
    fn create_session(&self, session: &MatchSession) -> Result<(), StoreError> {
        let _guard = self.write_guard()?;
        let path = self.path_for(SESSIONS, &session.id.0)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists {
                kind: "session",
                id: session.id.0.clone(),
            });
        }
        write_json(&path, session)
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<MatchSession>, StoreError> {
        let _guard = self.guard();
        self.load(SESSIONS, &id.0)
    }

    fn list_sessions(&self) -> Result<Vec<MatchSession>, StoreError> {
        let _guard = self.guard();
        let mut sessions: Vec<MatchSession> = self.list(SESSIONS)?;
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    fn modify_session(
        &self,
        id: &SessionId,
        change: &mut dyn FnMut(&mut MatchSession) -> bool,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_guard()?;
        let path = self.path_for(SESSIONS, &id.0)?;
        let Some(mut session) = read_json::<MatchSession>(&path)? else {
            return Err(StoreError::NotFound {
                kind: "session",
                id: id.0.clone(),
            });
        };
        if !change(&mut session) {
            return Ok(false);
        }
        write_json(&path, &session)?;
        Ok(true)
    }

    fn append_log(&self, entry: &MatchLogEntry) -> Result<(), StoreError> {
        validate_id(&entry.session_id.0)?;
        let _guard = self.guard();
        let path = self
            .base_path
            .join(LOGS)
            .join(format!("{}.jsonl", entry.session_id.0));
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;
        file.sync_all()?;
        Ok(())
    }

    fn session_logs(&self, id: &SessionId) -> Result<Vec<MatchLogEntry>, StoreError> {
        validate_id(&id.0)?;
        let _guard = self.guard();
        let path = self.base_path.join(LOGS).join(format!("{}.jsonl", id.0));
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

impl JobStore for JsonStore {
    fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let _guard = self.guard();
        self.load(JOBS, &id.0)
    }

    fn save_job(&self, job: &Job) -> Result<(), StoreError> {
        let _guard = self.write_guard()?;
        write_json(&self.path_for(JOBS, &job.id.0)?, job)
    }

    fn save_match(&self, id: &JobId, result: &JobMatch) -> Result<(), StoreError> {
        let _guard = self.write_guard()?;
        let path = self.path_for(JOBS, &id.0)?;
        let Some(mut job) = read_json::<Job>(&path)? else {
            return Err(StoreError::NotFound {
                kind: "job",
                id: id.0.clone(),
            });
        };
        job.matched = Some(result.clone());
        write_json(&path, &job)
    }

    fn unmatched_job_ids(&self) -> Result<Vec<JobId>, StoreError> {
        let _guard = self.guard();
        let mut ids: Vec<JobId> = self
            .list::<Job>(JOBS)?
            .into_iter()
            .filter(|job| !job.is_matched())
            .map(|job| job.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl ProfileSource for JsonStore {
    fn load_profile(&self) -> Result<Option<CandidateProfile>, StoreError> {
        read_json(&self.profile_path())
    }
}

/// Ids become file names; anything that could escape the directory is refused
fn validate_id(id: &str) -> Result<(), StoreError> {
    let bad = id.is_empty()
        || id.starts_with('.')
        || id.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a temp file so readers never see a partial document
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
