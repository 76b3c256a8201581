// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests

use crate::error::EngineError;
use crate::queue::BoundedQueue;
use crate::strategy::{JobOutcome, MatchObserver, StrategyContext};
use jm_adapters::FakeProvider;
use jm_core::{
    CandidateProfile, CircuitBreaker, FakeClock, Job, JobId, MatcherConfig, RetryPolicy,
    SessionCounters,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Defaults with millisecond backoff so retry paths stay fast
pub(crate) fn fast_config() -> MatcherConfig {
    MatcherConfig {
        timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_jitter: Duration::ZERO,
            server_error_multiplier: 2,
        },
        ..MatcherConfig::default()
    }
}

pub(crate) fn profile() -> CandidateProfile {
    CandidateProfile {
        name: "Sam".to_string(),
        skills: vec!["rust".to_string(), "tokio".to_string()],
        ..CandidateProfile::default()
    }
}

/// `job-1 .. job-n`, titled `Job 1 .. Job n`
pub(crate) fn jobs(n: usize) -> Vec<Job> {
    (1..=n)
        .map(|i| Job::new(format!("job-{}", i), format!("Job {}", i)).with_description("Build"))
        .collect()
}

pub(crate) fn marker(i: usize) -> String {
    FakeProvider::title_marker(&format!("Job {}", i))
}

pub(crate) fn context(
    provider: FakeProvider,
    config: MatcherConfig,
) -> StrategyContext<FakeProvider, FakeClock> {
    let queue = BoundedQueue::new(config.concurrency_limit, config.inter_request_delay);
    StrategyContext {
        provider,
        breaker: Arc::new(CircuitBreaker::new(
            config.circuit_breaker.clone(),
            FakeClock::new(),
        )),
        config: Arc::new(config),
        profile: Arc::new(profile()),
        queue: Arc::new(queue),
    }
}

/// Observer that records every callback and can request a stop
#[derive(Default)]
pub(crate) struct Collector {
    pub results: Mutex<Vec<(JobId, bool)>>,
    pub progress: Mutex<Vec<SessionCounters>>,
    /// Report a stop once this many results were seen
    pub stop_after: Option<usize>,
    pub fail_callbacks: bool,
    pub stop_checks: AtomicUsize,
}

impl Collector {
    pub fn stopping_after(n: usize) -> Self {
        Self {
            stop_after: Some(n),
            ..Self::default()
        }
    }

    pub fn result_ids(&self) -> Vec<JobId> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn last_progress(&self) -> Option<SessionCounters> {
        self.progress.lock().unwrap().last().copied()
    }
}

impl MatchObserver for Collector {
    fn should_stop(&self) -> bool {
        self.stop_checks.fetch_add(1, Ordering::SeqCst);
        match self.stop_after {
            Some(n) => self.results.lock().unwrap().len() >= n,
            None => false,
        }
    }

    fn on_result(&self, job: &Job, outcome: &JobOutcome) -> Result<(), EngineError> {
        self.results
            .lock()
            .unwrap()
            .push((job.id.clone(), outcome.is_success()));
        if self.fail_callbacks {
            return Err(EngineError::ProfileMissing);
        }
        Ok(())
    }

    fn on_progress(&self, counters: &SessionCounters) {
        self.progress.lock().unwrap().push(*counters);
    }
}
