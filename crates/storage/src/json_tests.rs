// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use jm_core::{LogStatus, MatchResult, SessionCounters, SessionStatus, TriggerSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn session(id: &str, minute: u32) -> MatchSession {
    let mut s = MatchSession::new(SessionId::from(id), TriggerSource::Manual, None, 3);
    s.started_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap());
    s
}

fn log(session: &str, job: &str) -> MatchLogEntry {
    MatchLogEntry {
        session_id: SessionId::from(session),
        job_id: JobId::from(job),
        status: LogStatus::Succeeded,
        score: Some(80.0),
        attempt_count: 1,
        error_type: None,
        error_message: None,
        duration_ms: 12,
        model_used: "gpt-4o-mini".to_string(),
        completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

fn job_match(score: f64) -> JobMatch {
    JobMatch {
        result: MatchResult {
            score,
            reasons: vec![],
            matched_skills: vec!["rust".to_string()],
            missing_skills: vec![],
            recommendations: vec![],
        },
        model: "gpt-4o-mini".to_string(),
        matched_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn session_roundtrip() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.create_session(&session("s-1", 0)).unwrap();
    let loaded = store.get_session(&SessionId::from("s-1")).unwrap().unwrap();
    assert_eq!(loaded, session("s-1", 0));
    assert!(store.get_session(&SessionId::from("nope")).unwrap().is_none());
}

#[test]
fn create_session_refuses_duplicates() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    store.create_session(&session("s-1", 0)).unwrap();

    let err = store.create_session(&session("s-1", 0)).unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[test]
fn list_sessions_newest_first() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    store.create_session(&session("old", 1)).unwrap();
    store.create_session(&session("new", 30)).unwrap();
    store.create_session(&session("mid", 10)).unwrap();

    let ids: Vec<_> = store
        .list_sessions()
        .unwrap()
        .into_iter()
        .map(|s| s.id.0)
        .collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[test]
fn modify_session_persists_only_accepted_changes() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let id = SessionId::from("s-1");
    store.create_session(&session("s-1", 0)).unwrap();

    let applied = store
        .modify_session(&id, &mut |s| {
            s.status = SessionStatus::InProgress;
            true
        })
        .unwrap();
    assert!(applied);

    let applied = store
        .modify_session(&id, &mut |s| {
            s.status = SessionStatus::Completed;
            false
        })
        .unwrap();
    assert!(!applied);

    let loaded = store.get_session(&id).unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::InProgress);
}

#[test]
fn modify_missing_session_is_not_found() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let err = store
        .modify_session(&SessionId::from("ghost"), &mut |_| true)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "session", .. }));
}

#[test]
fn logs_append_in_order_per_session() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.append_log(&log("s-1", "job-1")).unwrap();
    store.append_log(&log("s-2", "job-9")).unwrap();
    store.append_log(&log("s-1", "job-2")).unwrap();

    let jobs: Vec<_> = store
        .session_logs(&SessionId::from("s-1"))
        .unwrap()
        .into_iter()
        .map(|e| e.job_id.0)
        .collect();
    assert_eq!(jobs, vec!["job-1", "job-2"]);
    assert!(store
        .session_logs(&SessionId::from("s-3"))
        .unwrap()
        .is_empty());
}

#[test]
fn unmatched_ids_skip_matched_jobs() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    store.save_job(&Job::new("job-b", "Backend")).unwrap();
    store.save_job(&Job::new("job-a", "Platform")).unwrap();
    store.save_job(&Job::new("job-c", "Infra")).unwrap();

    store
        .save_match(&JobId::from("job-b"), &job_match(72.0))
        .unwrap();

    assert_eq!(
        store.unmatched_job_ids().unwrap(),
        vec![JobId::from("job-a"), JobId::from("job-c")]
    );
    let job = store.get_job(&JobId::from("job-b")).unwrap().unwrap();
    assert_eq!(job.matched.unwrap().result.score, 72.0);
}

#[test]
fn save_match_on_missing_job_fails() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let err = store
        .save_match(&JobId::from("ghost"), &job_match(50.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "job", .. }));
}

#[test]
fn ids_with_path_separators_are_rejected() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    for bad in ["../escape", "a/b", ".hidden", ""] {
        let err = store.get_job(&JobId::from(bad)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)), "{bad:?}");
    }
}

#[test]
fn profile_missing_then_saved() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    assert!(store.load_profile().unwrap().is_none());

    let profile = CandidateProfile {
        name: "Ada".to_string(),
        skills: vec!["rust".to_string()],
        ..Default::default()
    };
    store.save_profile(&profile).unwrap();
    assert_eq!(store.load_profile().unwrap(), Some(profile));
}

#[test]
fn clones_share_state() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let other = store.clone();

    store.create_session(&session("s-1", 0)).unwrap();
    assert!(other.get_session(&SessionId::from("s-1")).unwrap().is_some());
}

#[test]
fn separate_handles_serialize_session_rewrites() {
    let dir = tempdir().unwrap();
    let runner = JsonStore::open(dir.path()).unwrap();
    let stopper = JsonStore::open(dir.path()).unwrap();
    let id = SessionId::from("s-1");
    runner.create_session(&session("s-1", 0)).unwrap();
    runner
        .modify_session(&id, &mut |s| s.begin(Utc::now()))
        .unwrap();

    let stopped = Arc::new(AtomicBool::new(false));
    let mut stop_thread = None;
    let applied = runner
        .modify_session(&id, &mut |s| {
            let stopper = stopper.clone();
            let thread_stopped = stopped.clone();
            let id = id.clone();
            stop_thread = Some(thread::spawn(move || {
                let applied = stopper
                    .modify_session(&id, &mut |s| s.stop(Utc::now()))
                    .unwrap();
                thread_stopped.store(true, Ordering::SeqCst);
                applied
            }));
            thread::sleep(Duration::from_millis(100));
            assert!(!stopped.load(Ordering::SeqCst), "stop ran during a rewrite");
            s.apply_counters(SessionCounters::from_totals(2, 0, 0))
        })
        .unwrap();
    assert!(applied);
    assert!(stop_thread.unwrap().join().unwrap());

    let loaded = stopper.get_session(&id).unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::Failed);
    assert_eq!(loaded.jobs_succeeded, 2);
    assert_eq!(loaded.jobs_completed, 2);
}

#[test]
fn stop_from_another_handle_blocks_later_updates() {
    let dir = tempdir().unwrap();
    let runner = JsonStore::open(dir.path()).unwrap();
    let stopper = JsonStore::open(dir.path()).unwrap();
    let id = SessionId::from("s-1");
    runner.create_session(&session("s-1", 0)).unwrap();
    runner
        .modify_session(&id, &mut |s| s.begin(Utc::now()))
        .unwrap();

    assert!(stopper
        .modify_session(&id, &mut |s| s.stop(Utc::now()))
        .unwrap());
    let applied = runner
        .modify_session(&id, &mut |s| {
            s.apply_counters(SessionCounters::from_totals(20, 0, 0))
        })
        .unwrap();

    assert!(!applied);
    let loaded = runner.get_session(&id).unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::Failed);
    assert_eq!(loaded.jobs_succeeded, 0);
    assert!(dir.path().join("store.lock").exists());
}
