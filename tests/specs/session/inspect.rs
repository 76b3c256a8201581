//! Session inspection specs

use crate::prelude::*;

#[test]
fn sessions_empty_data_dir() {
    let temp = Project::empty();

    temp.jm()
        .args(&["sessions"])
        .passes()
        .stdout_has("No sessions");
}

#[test]
fn status_of_unknown_session_fails() {
    let temp = Project::empty();

    temp.jm()
        .args(&["status", "nope"])
        .fails()
        .stderr_has("Session 'nope' not found")
        .stderr_has("jm sessions");
}

#[test]
fn logs_of_unknown_session_fails() {
    let temp = Project::empty();

    temp.jm()
        .args(&["logs", "nope"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn stop_of_unknown_session_fails() {
    let temp = Project::empty();

    temp.jm()
        .args(&["stop", "nope"])
        .fails()
        .stderr_has("Session 'nope' not found");
}

#[test]
fn unmatched_lists_saved_jobs_in_order() {
    let temp = Project::with_jobs(&[("job-b", "Platform"), ("job-a", "Backend")]);

    let run = temp.jm().args(&["unmatched"]).passes();

    assert_eq!(run.stdout(), "job-a\njob-b\n");
}
