// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jm-core: pure building blocks of the match engine
//!
//! This crate provides:
//! - Clock and id abstractions for deterministic tests
//! - Session, log, job and match-result types
//! - The error taxonomy and its classifier
//! - The circuit breaker, retry/backoff and timeout primitives
//! - Matcher configuration and prompt building

pub mod clock;
pub mod id;

pub mod classify;
pub mod error;

pub mod circuit;
pub mod retry;

pub mod config;
pub mod job;
pub mod prompt;
pub mod result;
pub mod session;

pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
pub use classify::classify;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, MatcherConfig, SettingsSource, StaticSettings, TomlSettings};
pub use error::{ErrorKind, MatchError, ProviderError};
pub use id::{IdGen, SequentialIdGen, SessionId, UuidIdGen};
pub use job::{dedupe_job_ids, CandidateProfile, Experience, Job, JobId, JobMatch};
pub use result::{MatchReason, MatchResult, ReasonImpact};
pub use retry::{retry_with_backoff, with_timeout, RetryAttempt, RetryPolicy};
pub use session::{
    LogStatus, MatchLogEntry, MatchSession, SessionCounters, SessionStatus, TriggerSource,
};
