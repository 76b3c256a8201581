// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for provider calls
//!
//! Every failed provider call is reduced to one [`ErrorKind`]. The kind alone
//! decides retryability and the status code reported at the API boundary;
//! [`MatchError`] carries it together with the original message.

use crate::classify::classify;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Closed set of failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Timeout,
    RateLimit,
    Network,
    JsonParse,
    NoObject,
    CircuitBreaker,
    Unknown,
}

impl ErrorKind {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Shape errors (bad input, bad output, unparseable output) and an open
    /// circuit are final for the current call.
    pub fn is_retryable(self) -> bool {
        !matches!(
            self,
            ErrorKind::Validation
                | ErrorKind::CircuitBreaker
                | ErrorKind::JsonParse
                | ErrorKind::NoObject
        )
    }

    /// HTTP status reported for this kind at the API boundary
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NoObject => 422,
            ErrorKind::RateLimit => 429,
            ErrorKind::Unknown => 500,
            ErrorKind::Network | ErrorKind::JsonParse => 502,
            ErrorKind::CircuitBreaker => 503,
            ErrorKind::Timeout => 504,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Network => "network",
            ErrorKind::JsonParse => "json_parse",
            ErrorKind::NoObject => "no_object",
            ErrorKind::CircuitBreaker => "circuit_breaker",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failure reported by an AI provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Request or response failed schema validation
    #[error("validation failed: {0}")]
    Validation(String),
    /// Provider answered without producing a structured object
    #[error("no object generated: {0}")]
    NoObject(String),
    /// Structured-output generation failed for an unspecified reason
    #[error("structured output generation failed: {0}")]
    Generation(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A classified failure of one job's provider call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct MatchError {
    pub kind: ErrorKind,
    pub message: String,
    /// Upstream HTTP status, when the provider reported one
    pub status: Option<u16>,
    /// Provider invocations made before giving up (0 when none were made)
    pub attempts: u32,
}

impl MatchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            attempts: 0,
        }
    }

    /// Call rejected because the circuit breaker is open
    pub fn circuit_open() -> Self {
        Self::new(
            ErrorKind::CircuitBreaker,
            "circuit breaker is open; provider calls are suspended",
        )
    }

    /// Operation `label` exceeded its deadline
    pub fn timeout(label: &str, after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("{} timed out after {}ms", label, after.as_millis()),
        )
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<ProviderError> for MatchError {
    fn from(err: ProviderError) -> Self {
        Self {
            kind: classify(&err),
            status: err.status(),
            message: err.to_string(),
            attempts: 0,
        }
    }
}
