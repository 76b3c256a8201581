// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoring prompts

use crate::job::{CandidateProfile, Job};
use std::fmt::Write;

/// Long postings are cut to keep prompts within provider limits
pub const MAX_DESCRIPTION_CHARS: usize = 6000;

pub const SYSTEM_PROMPT: &str = "You are an experienced technical recruiter. \
Score how well the candidate fits each job on a 0-100 scale, where 90+ is an \
exceptional fit, 70-89 strong, 50-69 partial and below 50 weak. Ground every \
reason in the job text and the candidate profile. List the job's required \
skills the candidate has and lacks, and give concrete recommendations for the \
application. Respond only with JSON matching the provided schema.";

/// Prompt for scoring a single job
pub fn single_job_prompt(job: &Job, profile: &CandidateProfile) -> String {
    let mut prompt = String::new();
    write_profile(&mut prompt, profile);
    prompt.push_str("\n## Job\n");
    write_job(&mut prompt, job);
    prompt
}

/// Prompt for scoring several jobs in one call
///
/// Each job is introduced with its id so the answer can be keyed back.
pub fn bulk_prompt(jobs: &[Job], profile: &CandidateProfile) -> String {
    let mut prompt = String::new();
    write_profile(&mut prompt, profile);
    let _ = writeln!(
        prompt,
        "\nScore each of the following {} jobs. Return one entry per job in \
         `matches`, with `job_id` copied exactly from the job header.",
        jobs.len()
    );
    for job in jobs {
        let _ = writeln!(prompt, "\n## Job {}", job.id);
        write_job(&mut prompt, job);
    }
    prompt
}

fn write_profile(out: &mut String, profile: &CandidateProfile) {
    out.push_str("## Candidate\n");
    if !profile.name.is_empty() {
        let _ = writeln!(out, "Name: {}", profile.name);
    }
    if !profile.headline.is_empty() {
        let _ = writeln!(out, "Headline: {}", profile.headline);
    }
    if !profile.summary.is_empty() {
        let _ = writeln!(out, "Summary: {}", profile.summary);
    }
    if !profile.skills.is_empty() {
        let _ = writeln!(out, "Skills: {}", profile.skills.join(", "));
    }
    if !profile.experience.is_empty() {
        out.push_str("Experience:\n");
        for exp in &profile.experience {
            let years = exp.years.map(|y| format!(" ({} yrs)", y)).unwrap_or_default();
            let _ = writeln!(out, "- {} at {}{}: {}", exp.title, exp.company, years, exp.summary);
        }
    }
    if !profile.education.is_empty() {
        let _ = writeln!(out, "Education: {}", profile.education.join("; "));
    }
    if let Some(preferences) = &profile.preferences {
        let _ = writeln!(out, "Preferences: {}", preferences);
    }
}

fn write_job(out: &mut String, job: &Job) {
    let _ = writeln!(out, "Title: {}", job.title);
    if let Some(company) = &job.company {
        let _ = writeln!(out, "Company: {}", company);
    }
    let _ = writeln!(
        out,
        "Description:\n{}",
        truncate_chars(&job.description, MAX_DESCRIPTION_CHARS)
    );
    if let Some(requirements) = &job.requirements {
        let _ = writeln!(
            out,
            "Requirements:\n{}",
            truncate_chars(requirements, MAX_DESCRIPTION_CHARS)
        );
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
