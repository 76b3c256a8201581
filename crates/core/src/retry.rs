// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter, and per-call timeouts

use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Backoff parameters for provider calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total invocations allowed, including the first
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Upper bound of the uniform random jitter added to every delay
    #[serde(with = "humantime_serde")]
    pub max_jitter: Duration,
    /// Delay multiplier applied to server overload and throttling errors
    pub server_error_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_secs(1),
            server_error_multiplier: 3,
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^(attempt-1), max) + jitter` for the given 1-based attempt
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let exponential = self.base_delay.saturating_mul(factor).min(self.max_delay);
        exponential + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(fastrand::u64(0..=max_ms))
        }
    }
}

/// Context handed to the retry observer before each backoff
#[derive(Debug)]
pub struct RetryAttempt<'a> {
    /// The attempt that just failed (1-based)
    pub attempt: u32,
    pub max_retries: u32,
    pub error: &'a MatchError,
    /// Delay computed by the policy
    pub delay: Duration,
}

/// Invoke `op` until it succeeds, fails with a non-retryable error, or runs
/// out of attempts
///
/// `on_retry` runs before every backoff sleep; returning `Some(delay)`
/// replaces the computed delay. On success the result is paired with the
/// number of invocations made. Failures carry that count in
/// [`MatchError::attempts`].
pub async fn retry_with_backoff<T, F, Fut, O>(
    policy: &RetryPolicy,
    mut op: F,
    mut on_retry: O,
) -> Result<(T, u32), MatchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, MatchError>>,
    O: FnMut(&RetryAttempt<'_>) -> Option<Duration>,
{
    let max_retries = policy.max_retries.max(1);
    let mut attempt = 1;

    loop {
        let error = match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(error) => error,
        };

        if !error.is_retryable() || attempt >= max_retries {
            return Err(error.with_attempts(attempt));
        }

        let computed = policy.backoff_delay(attempt);
        let delay = on_retry(&RetryAttempt {
            attempt,
            max_retries,
            error: &error,
            delay: computed,
        })
        .unwrap_or(computed);

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Race `fut` against a timer
///
/// On expiry the operation is dropped and a `timeout` error naming `label`
/// is returned.
pub async fn with_timeout<T, Fut>(fut: Fut, timeout: Duration, label: &str) -> Result<T, MatchError>
where
    Fut: Future<Output = Result<T, MatchError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(MatchError::timeout(label, timeout)),
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
