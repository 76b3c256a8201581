//! End-to-end run against an unreachable provider
//!
//! Every call fails with a network error, so each job is retried and then
//! recorded as failed without aborting the session.

use crate::prelude::*;

fn failed_run(temp: &Project) -> String {
    let run = temp
        .jm()
        .args(&["--format", "json", "run", "--unmatched"])
        .env("OPENAI_API_KEY", "test-key")
        .env("OPENAI_BASE_URL", UNREACHABLE_BASE_URL)
        .passes();
    let summary = run.json();

    assert_eq!(summary["total"], 2);
    assert_eq!(summary["succeeded"], 0);
    assert_eq!(summary["failed"], 2);
    summary["session_id"].as_str().unwrap().to_string()
}

#[test]
fn unreachable_provider_fails_every_job() {
    let temp = Project::with_jobs(&[("job-1", "Backend"), ("job-2", "Platform")]);
    temp.file("matcher.toml", FAST_SETTINGS);

    let session = failed_run(&temp);

    temp.jm()
        .args(&["status", &session])
        .passes()
        .stdout_has("Status: failed")
        .stdout_has("Trigger: match_unmatched")
        .stdout_has("Jobs: 2/2")
        .stdout_has("Errors: 4");
}

#[test]
fn failed_jobs_are_logged_with_their_kind() {
    let temp = Project::with_jobs(&[("job-1", "Backend"), ("job-2", "Platform")]);
    temp.file("matcher.toml", FAST_SETTINGS);

    let session = failed_run(&temp);

    let run = temp
        .jm()
        .args(&["--format", "json", "logs", &session])
        .passes();
    let entries = run.json();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["status"], "failed");
        assert_eq!(entry["error_type"], "network");
        assert_eq!(entry["attempt_count"], 2);
    }
}

#[test]
fn failed_jobs_stay_unmatched_and_session_is_listed() {
    let temp = Project::with_jobs(&[("job-1", "Backend"), ("job-2", "Platform")]);
    temp.file("matcher.toml", FAST_SETTINGS);

    let session = failed_run(&temp);

    temp.jm()
        .args(&["unmatched"])
        .passes()
        .stdout_has("job-1")
        .stdout_has("job-2");
    temp.jm()
        .args(&["sessions"])
        .passes()
        .stdout_has(&session)
        .stdout_has("failed");
    temp.jm()
        .args(&["stop", &session])
        .passes()
        .stdout_has("already finished");
}
