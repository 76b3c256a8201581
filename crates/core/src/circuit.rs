// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker guarding calls to the AI provider
//!
//! One breaker models provider-wide health for a single engine run and is
//! shared by every in-flight job of that run.
//!
//! ```text
//! Closed   --failure_threshold consecutive failures-->  Open
//! Open     --reset_timeout since last failure------->  HalfOpen   (lazy, on read)
//! HalfOpen --any failure---------------------------->  Open
//! HalfOpen --half_open_max_calls successes---------->  Closed     (counters reset)
//! ```

use crate::clock::Clock;
use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thresholds for the breaker state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip a closed circuit
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls after its last failure
    #[serde(with = "humantime_serde")]
    pub reset_timeout: Duration,
    /// Probe calls admitted while half-open; this many successes close it
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 10,
            reset_timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn name(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Point-in-time view of the breaker counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time: Option<Instant>,
    pub half_open_call_count: u32,
}

/// Failure-rate state machine shared across concurrent tasks
///
/// All transitions happen under one lock, so interleaved
/// `record_success`/`record_failure` calls from many tasks never observe a
/// half-applied transition.
pub struct CircuitBreaker<C: Clock> {
    config: CircuitBreakerConfig,
    clock: C,
    inner: Mutex<CircuitSnapshot>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(config: CircuitBreakerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            inner: Mutex::new(CircuitSnapshot {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_time: None,
                half_open_call_count: 0,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Whether a call would currently be admitted
    pub fn can_execute(&self) -> bool {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => inner.half_open_call_count < self.config.half_open_max_calls,
        }
    }

    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.clone()
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.half_open_max_calls {
                    tracing::info!(
                        probes = inner.success_count,
                        "circuit breaker closed after successful probes"
                    );
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.half_open_call_count = 0;
                }
            }
            // A call admitted before the circuit opened finished late
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self, error: &MatchError) {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.failure_count += 1;
        inner.last_failure_time = Some(self.clock.now());

        match inner.state {
            CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                tracing::warn!(
                    failures = inner.failure_count,
                    kind = %error.kind,
                    "circuit breaker opened"
                );
                inner.state = CircuitState::Open;
            }
            CircuitState::HalfOpen => {
                tracing::warn!(kind = %error.kind, "probe failed, circuit breaker reopened");
                inner.state = CircuitState::Open;
                inner.success_count = 0;
                inner.half_open_call_count = 0;
            }
            CircuitState::Closed | CircuitState::Open => {}
        }
    }

    /// Run `op` if the circuit admits it, recording the outcome
    ///
    /// A rejected call fails with a `circuit_breaker` error without invoking
    /// `op`, and does not count as a failure.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, MatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MatchError>>,
    {
        if !self.try_admit() {
            return Err(MatchError::circuit_open());
        }

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Admission with half-open probe accounting
    fn try_admit(&self) -> bool {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.half_open_call_count < self.config.half_open_max_calls {
                    inner.half_open_call_count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Lazy OPEN -> HALF_OPEN transition once the reset timeout has elapsed
    fn refresh(&self, inner: &mut CircuitSnapshot) {
        if inner.state != CircuitState::Open {
            return;
        }
        let elapsed = inner
            .last_failure_time
            .map(|t| self.clock.now().saturating_duration_since(t));
        if elapsed.is_some_and(|e| e >= self.config.reset_timeout) {
            tracing::info!("circuit breaker half-open, admitting probes");
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
            inner.half_open_call_count = 0;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CircuitSnapshot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "circuit_tests.rs"]
mod tests;
