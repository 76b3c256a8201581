// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Every error that reaches `main` is rendered through [`explain`], which
//! attaches recovery hints for the failures users can fix themselves.

use jm_core::{ConfigError, ProviderError};
use jm_engine::{EngineError, TrackerError};
use jm_storage::StoreError;
use std::fmt;

/// Error with context and recovery suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn session_not_found(session_id: &str) -> Self {
        CliError::new(format!("Session '{}' not found", session_id))
            .with_suggestion("List known sessions: jm sessions")
    }

    pub fn nothing_to_match() -> Self {
        CliError::new("No jobs to match")
            .with_suggestion("Pass job ids: jm run <JOB_ID>...")
            .with_suggestion("Or match every unmatched job: jm run --unmatched")
    }

    pub fn missing_api_key() -> Self {
        CliError::new("OPENAI_API_KEY is not set")
            .with_context("Matching calls an OpenAI-compatible chat completions endpoint")
            .with_suggestion("Export the key: export OPENAI_API_KEY=...")
            .with_suggestion("Point at another endpoint with OPENAI_BASE_URL")
    }

    pub fn profile_missing() -> Self {
        CliError::new("No candidate profile available")
            .with_context("Jobs are scored against the profile in the data directory")
            .with_suggestion("Write the profile to <data-dir>/profile.json")
    }

    pub fn invalid_config(detail: impl fmt::Display) -> Self {
        CliError::new("Matcher settings are invalid")
            .with_context(detail.to_string())
            .with_suggestion("Check <data-dir>/matcher.toml")
            .with_suggestion("Show the effective settings: jm config")
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {}

/// Render an error with whatever hints apply to it
pub fn explain(err: &anyhow::Error) -> CliError {
    if let Some(e) = err.downcast_ref::<CliError>() {
        return e.clone();
    }
    if let Some(e) = err.downcast_ref::<EngineError>() {
        match e {
            EngineError::ProfileMissing => return CliError::profile_missing(),
            EngineError::Config(config) => return CliError::invalid_config(config),
            EngineError::Tracker(TrackerError::SessionNotFound(id)) => {
                return CliError::session_not_found(&id.0)
            }
            _ => {}
        }
    }
    if let Some(TrackerError::SessionNotFound(id)) = err.downcast_ref::<TrackerError>() {
        return CliError::session_not_found(&id.0);
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return CliError::invalid_config(e);
    }
    if let Some(ProviderError::Validation(message)) = err.downcast_ref::<ProviderError>() {
        if message.contains("OPENAI_API_KEY") {
            return CliError::missing_api_key();
        }
    }
    if let Some(StoreError::InvalidId(id)) = err.downcast_ref::<StoreError>() {
        return CliError::new(format!("Invalid identifier {:?}", id))
            .with_context("Ids must not be empty, start with '.', or contain path separators");
    }

    err.chain()
        .skip(1)
        .fold(CliError::new(err.to_string()), |acc, cause| {
            acc.with_context(cause.to_string())
        })
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
