// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure classifier from provider failures to [`ErrorKind`]
//!
//! Explicit variants win; free-form messages fall through an ordered list of
//! substring heuristics. The order matters: a "gateway timeout" is a timeout,
//! not a server error, and an overloaded upstream is throttling rather than
//! an unknown failure.

use crate::error::{ErrorKind, ProviderError};

const CIRCUIT_MARKERS: &[&str] = &["circuit breaker is open", "circuit open"];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "etimedout", "deadline exceeded"];
const NETWORK_MARKERS: &[&str] = &[
    "econnrefused",
    "econnreset",
    "enotfound",
    "connection refused",
    "connection reset",
    "socket hang up",
    "fetch failed",
    "network",
];
const SERVER_STATUSES: &[u16] = &[502, 503, 504, 529];
const SERVER_MARKERS: &[&str] = &["overloaded", "service unavailable", "bad gateway"];
const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "ratelimit",
    "too many requests",
    "quota",
    "throttl",
];
const JSON_MARKERS: &[&str] = &["json", "parse", "syntax", "unexpected token", "unexpected end"];
const SCHEMA_MARKERS: &[&str] = &["schema", "zod", "invalid", "validation"];

/// Classify a provider failure
pub fn classify(err: &ProviderError) -> ErrorKind {
    match err {
        ProviderError::Validation(_) => ErrorKind::Validation,
        ProviderError::NoObject(_) => ErrorKind::NoObject,
        ProviderError::Generation(message) => classify_generation(message),
        ProviderError::Timeout(_) => ErrorKind::Timeout,
        ProviderError::Parse(_) => ErrorKind::JsonParse,
        ProviderError::Network(message) => {
            if contains_any(&message.to_lowercase(), TIMEOUT_MARKERS) {
                ErrorKind::Timeout
            } else {
                ErrorKind::Network
            }
        }
        ProviderError::Http { status, message } => classify_message(Some(*status), message),
        ProviderError::Other(message) => classify_message(None, message),
    }
}

/// A generic structured-output failure is either a schema mismatch or a
/// throttled upstream; anything else stays unknown.
fn classify_generation(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    if contains_any(&lower, SCHEMA_MARKERS) || lower.contains("does not match") {
        ErrorKind::Validation
    } else if contains_any(&lower, RATE_LIMIT_MARKERS) || contains_any(&lower, SERVER_MARKERS) {
        ErrorKind::RateLimit
    } else {
        ErrorKind::Unknown
    }
}

/// Heuristic classification of a free-form message and optional status
pub fn classify_message(status: Option<u16>, message: &str) -> ErrorKind {
    let lower = message.to_lowercase();

    if contains_any(&lower, CIRCUIT_MARKERS) {
        return ErrorKind::CircuitBreaker;
    }
    if contains_any(&lower, TIMEOUT_MARKERS) || status == Some(408) {
        return ErrorKind::Timeout;
    }
    if contains_any(&lower, NETWORK_MARKERS) {
        return ErrorKind::Network;
    }
    // Server-side overload is retryable throttling
    if status.is_some_and(|s| SERVER_STATUSES.contains(&s)) || contains_any(&lower, SERVER_MARKERS)
    {
        return ErrorKind::RateLimit;
    }
    if status == Some(429) || lower.contains("429") || contains_any(&lower, RATE_LIMIT_MARKERS) {
        return ErrorKind::RateLimit;
    }
    if contains_any(&lower, JSON_MARKERS) {
        return ErrorKind::JsonParse;
    }
    if contains_any(&lower, SCHEMA_MARKERS) {
        return ErrorKind::Validation;
    }
    ErrorKind::Unknown
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
