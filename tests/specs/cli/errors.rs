//! Error reporting specs
//!
//! Failures users can fix print a suggestion and exit non-zero.

use crate::prelude::*;

#[test]
fn run_without_jobs_suggests_usage() {
    let temp = Project::with_jobs(&[]);

    temp.jm()
        .args(&["run"])
        .fails()
        .stderr_has("No jobs to match")
        .stderr_has("jm run --unmatched");
}

#[test]
fn run_without_api_key_explains_setup() {
    let temp = Project::with_jobs(&[("job-1", "Backend Engineer")]);

    temp.jm()
        .args(&["run", "job-1"])
        .fails()
        .stderr_has("OPENAI_API_KEY is not set")
        .stderr_has("export OPENAI_API_KEY");
}

#[test]
fn run_unmatched_with_nothing_pending_is_not_an_error() {
    let temp = Project::with_jobs(&[]);

    temp.jm()
        .args(&["run", "--unmatched"])
        .passes()
        .stdout_has("No unmatched jobs");
}

#[test]
fn job_ids_and_unmatched_conflict() {
    let temp = Project::empty();

    temp.jm().args(&["run", "job-1", "--unmatched"]).fails();
}

#[test]
fn missing_profile_points_at_profile_file() {
    let temp = Project::empty();
    temp.job("job-1", "Backend Engineer");

    temp.jm()
        .args(&["run", "job-1"])
        .env("OPENAI_API_KEY", "test-key")
        .env("OPENAI_BASE_URL", UNREACHABLE_BASE_URL)
        .fails()
        .stderr_has("No candidate profile available")
        .stderr_has("profile.json");
}
