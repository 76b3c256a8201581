// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution strategies
//!
//! Each strategy turns a list of jobs into per-job outcomes. All of them
//! funnel provider calls through the same guard:
//!
//! ```text
//! retry_with_backoff( breaker.execute( with_timeout( provider call ) ) )
//! ```
//!
//! [`single::match_job`] is the unit primitive; parallel runs it under the
//! dispatch queue and bulk falls back to it for anything a batched call
//! could not answer.

pub mod bulk;
pub mod parallel;
pub mod single;

use crate::error::EngineError;
use crate::queue::DispatchQueue;
use jm_adapters::ProviderAdapter;
use jm_core::{
    CandidateProfile, CircuitBreaker, Clock, ErrorKind, Job, JobId, MatchError, MatchResult,
    MatcherConfig, RetryAttempt, SessionCounters,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything a strategy needs for one run
pub struct StrategyContext<P, C: Clock> {
    pub provider: P,
    /// Shared by every job of the run
    pub breaker: Arc<CircuitBreaker<C>>,
    pub config: Arc<MatcherConfig>,
    pub profile: Arc<CandidateProfile>,
    pub queue: Arc<dyn DispatchQueue>,
}

impl<P: Clone, C: Clock> Clone for StrategyContext<P, C> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            breaker: Arc::clone(&self.breaker),
            config: Arc::clone(&self.config),
            profile: Arc::clone(&self.profile),
            queue: Arc::clone(&self.queue),
        }
    }
}

/// Result of processing one job
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Succeeded {
        result: MatchResult,
        /// Provider invocations, including the successful one
        attempts: u32,
        duration: Duration,
    },
    Failed {
        error: MatchError,
        duration: Duration,
    },
}

impl JobOutcome {
    pub fn failed(error: MatchError, duration: Duration) -> Self {
        JobOutcome::Failed { error, duration }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            JobOutcome::Succeeded { attempts, .. } => *attempts,
            JobOutcome::Failed { error, .. } => error.attempts,
        }
    }

    /// Provider attempts of this job that failed
    pub fn failed_attempts(&self) -> u32 {
        match self {
            JobOutcome::Succeeded { attempts, .. } => attempts.saturating_sub(1),
            JobOutcome::Failed { error, .. } => error.attempts,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            JobOutcome::Succeeded { duration, .. } | JobOutcome::Failed { duration, .. } => {
                *duration
            }
        }
    }
}

/// Add one outcome to running totals
pub fn tally(counters: &mut SessionCounters, outcome: &JobOutcome) {
    if outcome.is_success() {
        counters.jobs_succeeded += 1;
    } else {
        counters.jobs_failed += 1;
    }
    counters.jobs_completed = counters.jobs_succeeded + counters.jobs_failed;
    counters.error_count += outcome.failed_attempts();
}

/// Outcomes of a run, keyed by job
#[derive(Debug, Default)]
pub struct BatchResults {
    pub outcomes: HashMap<JobId, JobOutcome>,
    /// Failed batched calls, not attributable to any one job
    pub shared_errors: u32,
}

impl BatchResults {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, id: &JobId) -> Option<&JobOutcome> {
        self.outcomes.get(id)
    }

    pub fn counters(&self) -> SessionCounters {
        let mut counters = SessionCounters {
            error_count: self.shared_errors,
            ..SessionCounters::default()
        };
        for outcome in self.outcomes.values() {
            tally(&mut counters, outcome);
        }
        counters
    }
}

/// Hooks a strategy calls while it runs
pub trait MatchObserver: Send + Sync {
    /// Checked before starting each job; `true` halts new work
    fn should_stop(&self) -> bool {
        false
    }

    /// A job finished. Failures here are logged and otherwise ignored.
    fn on_result(&self, _job: &Job, _outcome: &JobOutcome) -> Result<(), EngineError> {
        Ok(())
    }

    /// Running totals after every finished job
    fn on_progress(&self, _counters: &SessionCounters) {}

    /// A dispatch slot was granted; `waiting` callers remain queued
    fn on_dispatch(&self, _waiting: usize) {}
}

/// Which algorithm drives a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// One job at a time
    Single,
    /// Several jobs per provider call
    Bulk,
    /// Single calls under bounded concurrency
    Parallel,
}

impl StrategyKind {
    pub fn select(config: &MatcherConfig, job_count: usize) -> Self {
        if job_count <= 1 || config.serialize_operations {
            StrategyKind::Single
        } else if config.bulk_enabled {
            StrategyKind::Bulk
        } else {
            StrategyKind::Parallel
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Single => "single",
            StrategyKind::Bulk => "bulk",
            StrategyKind::Parallel => "parallel",
        }
    }

    /// Dispatch slots this strategy may use
    pub fn concurrency(&self, config: &MatcherConfig) -> usize {
        match self {
            StrategyKind::Single => 1,
            StrategyKind::Bulk | StrategyKind::Parallel => config.concurrency_limit,
        }
    }

    pub async fn run<P, C>(
        self,
        ctx: &StrategyContext<P, C>,
        jobs: Vec<Job>,
        observer: Arc<dyn MatchObserver>,
    ) -> BatchResults
    where
        P: ProviderAdapter,
        C: Clock,
    {
        match self {
            StrategyKind::Single => single::run(ctx, jobs, observer).await,
            StrategyKind::Bulk => bulk::run(ctx, jobs, observer).await,
            StrategyKind::Parallel => parallel::run(ctx, jobs, observer).await,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collects outcomes from concurrent tasks and reports progress
///
/// A job's totals land under one lock. The progress callback gets a copy
/// after the lock is released, so a slow store write never holds up other
/// tasks; observers drop copies older than what they already hold.
pub(crate) struct Recorder {
    observer: Arc<dyn MatchObserver>,
    state: Mutex<BatchResults>,
    counters: Mutex<SessionCounters>,
}

impl Recorder {
    pub(crate) fn new(observer: Arc<dyn MatchObserver>) -> Self {
        Self {
            observer,
            state: Mutex::new(BatchResults::default()),
            counters: Mutex::new(SessionCounters::default()),
        }
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.observer.should_stop()
    }

    pub(crate) fn dispatched(&self, waiting: usize) {
        self.observer.on_dispatch(waiting);
    }

    pub(crate) fn record(&self, job: &Job, outcome: JobOutcome) {
        if let Err(e) = self.observer.on_result(job, &outcome) {
            tracing::warn!(job_id = %job.id, error = %e, "result callback failed");
        }

        let snapshot = {
            let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
            tally(&mut counters, &outcome);
            self.state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .outcomes
                .insert(job.id.clone(), outcome);
            *counters
        };
        self.observer.on_progress(&snapshot);
    }

    /// Count failed attempts of a batched call
    pub(crate) fn shared_errors(&self, errors: u32) {
        if errors == 0 {
            return;
        }
        let snapshot = {
            let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
            counters.error_count += errors;
            self.state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .shared_errors += errors;
            *counters
        };
        self.observer.on_progress(&snapshot);
    }

    pub(crate) fn finish(&self) -> BatchResults {
        std::mem::take(&mut *self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Retry observer shared by every guarded call: logs, and stretches the
/// backoff for throttled or overloaded upstreams
pub(crate) fn on_retry(
    config: &MatcherConfig,
    label: &str,
    retry: &RetryAttempt<'_>,
) -> Option<Duration> {
    let delay = match retry.error.kind {
        ErrorKind::RateLimit => retry
            .delay
            .saturating_mul(config.retry.server_error_multiplier.max(1)),
        _ => retry.delay,
    };
    tracing::warn!(
        call = label,
        attempt = retry.attempt,
        max_retries = retry.max_retries,
        kind = %retry.error.kind,
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        error = %retry.error.message,
        "provider call failed, retrying"
    );
    Some(delay)
}

/// Provider options derived from the matcher configuration
pub(crate) fn provider_options(config: &MatcherConfig) -> serde_json::Value {
    match &config.reasoning_effort {
        Some(effort) => serde_json::json!({ "reasoning_effort": effort }),
        None => serde_json::Value::Null,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
