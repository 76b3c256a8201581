// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Integration tests for the match engine over the JSON file store
//!
//! Exercises a full run against on-disk sessions, logs and jobs.

use jm_adapters::{FakeProvider, FakeReply, TracedProvider};
use jm_core::{
    CandidateProfile, ErrorKind, FakeClock, Job, JobId, LogStatus, MatcherConfig, ProviderError,
    RetryPolicy, SequentialIdGen, SessionStatus, TomlSettings, TriggerSource,
};
use jm_engine::{MatchEngine, MatchEngineDeps, MatchOptions};
use jm_storage::{JobStore, JsonStore, MatchStore};
use std::time::Duration;
use tempfile::TempDir;

type Engine = MatchEngine<
    TracedProvider<FakeProvider>,
    TomlSettings,
    JsonStore,
    FakeClock,
    SequentialIdGen,
>;

fn setup(fake: FakeProvider, settings: &str, jobs: usize) -> (Engine, JsonStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    store
        .save_profile(&CandidateProfile {
            name: "Sam".to_string(),
            skills: vec!["rust".to_string()],
            ..CandidateProfile::default()
        })
        .unwrap();
    for i in 1..=jobs {
        store
            .save_job(&Job::new(format!("job-{}", i), format!("Job {}", i)).with_description("Build"))
            .unwrap();
    }
    let settings_path = dir.path().join("matcher.toml");
    std::fs::write(&settings_path, settings).unwrap();

    let engine = MatchEngine::new(
        MatchEngineDeps {
            provider: TracedProvider::new(fake),
            settings: TomlSettings::new(settings_path),
            store: store.clone(),
        },
        FakeClock::new(),
        SequentialIdGen::new("run"),
    );
    (engine, store, dir)
}

const FAST: &str = r#"
[matcher]
concurrency_limit = 2

[matcher.retry]
base_delay = "1ms"
max_delay = "4ms"
max_jitter = "0ms"
"#;

// =============================================================================
// Full runs
// =============================================================================

#[tokio::test]
async fn run_persists_session_logs_and_matches() {
    let fake = FakeProvider::new();
    fake.respond(
        FakeProvider::title_marker("Job 3"),
        FakeReply::Error(ProviderError::Http {
            status: 400,
            message: "Invalid schema for response_format".to_string(),
        }),
    );
    let (engine, store, _dir) = setup(fake, FAST, 4);
    let ids = store.unmatched_job_ids().unwrap();
    assert_eq!(ids.len(), 4);

    let summary = engine
        .match_with_tracking(ids, MatchOptions::new(TriggerSource::Manual))
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);

    let session = store.get_session(&summary.session_id).unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.jobs_completed, 4);

    let logs = store.session_logs(&summary.session_id).unwrap();
    assert_eq!(logs.len(), 4);
    let failed: Vec<_> = logs
        .iter()
        .filter(|e| e.status == LogStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].job_id, JobId::from("job-3"));
    assert_eq!(failed[0].error_type, Some(ErrorKind::Validation));

    assert_eq!(
        store.unmatched_job_ids().unwrap(),
        vec![JobId::from("job-3")]
    );
}

#[tokio::test]
async fn missing_settings_file_uses_defaults() {
    let (engine, store, dir) = setup(FakeProvider::new(), "", 1);
    std::fs::remove_file(dir.path().join("matcher.toml")).unwrap();

    let summary = engine
        .match_with_tracking(
            vec![JobId::from("job-1")],
            MatchOptions::new(TriggerSource::Manual),
        )
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    let job = store.get_job(&JobId::from("job-1")).unwrap().unwrap();
    assert_eq!(job.matched.unwrap().model, MatcherConfig::default().model);
}

#[tokio::test]
async fn background_unmatched_run_is_pollable() {
    let fake = FakeProvider::new().with_latency(Duration::from_millis(5));
    let (engine, store, _dir) = setup(fake, FAST, 5);

    let started = engine.start_match_unmatched().unwrap().unwrap();
    let session = store.get_session(&started.session_id).unwrap().unwrap();
    assert!(session.status.is_active());
    assert_eq!(session.jobs_total, 5);

    let summary = started.wait().await.unwrap();
    assert_eq!(summary.succeeded, 5);
    let session = store.get_session(&summary.session_id).unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.trigger_source, TriggerSource::MatchUnmatched);
}

#[tokio::test]
async fn circuit_opens_for_the_rest_of_a_run() {
    let fake = FakeProvider::new();
    fake.set_default(FakeReply::Error(ProviderError::Http {
        status: 500,
        message: "internal error".to_string(),
    }));
    let settings = r#"
[matcher]
serialize_operations = true

[matcher.retry]
max_retries = 2
base_delay = "1ms"
max_delay = "1ms"
max_jitter = "0ms"

[matcher.circuit_breaker]
failure_threshold = 3
"#;
    let (engine, store, _dir) = setup(fake.clone(), settings, 5);

    let summary = engine
        .match_with_tracking(
            store.unmatched_job_ids().unwrap(),
            MatchOptions::new(TriggerSource::Scheduler),
        )
        .await
        .unwrap();

    assert_eq!(summary.failed, 5);
    // Job 1 spends two attempts, job 2 trips the breaker on its first and
    // is rejected on its retry
    assert_eq!(fake.call_count(), 3);
    let logs = store.session_logs(&summary.session_id).unwrap();
    let breaker_failures = logs
        .iter()
        .filter(|e| e.error_type == Some(ErrorKind::CircuitBreaker))
        .count();
    assert_eq!(breaker_failures, 4);
    let session = store.get_session(&summary.session_id).unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[test]
fn retry_defaults_are_configurable() {
    let config = MatcherConfig::from_toml_str(FAST).unwrap();
    assert_eq!(config.concurrency_limit, 2);
    assert_eq!(
        config.retry,
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_jitter: Duration::ZERO,
            ..RetryPolicy::default()
        }
    );
}
