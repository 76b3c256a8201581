// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Match execution engine

mod engine;
mod error;
pub mod queue;
pub mod strategy;
mod tracker;

#[cfg(test)]
mod test_support;

pub use engine::{BackgroundMatch, MatchEngine, MatchEngineDeps, MatchOptions, MatchSummary};
pub use error::{EngineError, TrackerError};
pub use queue::{BoundedQueue, DispatchPermit, DispatchQueue, QueueClosed};
pub use strategy::{BatchResults, JobOutcome, MatchObserver, StrategyContext, StrategyKind};
pub use tracker::{ProgressPhase, ProgressSnapshot, ProgressTracker, SessionTracker};
