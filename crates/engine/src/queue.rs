// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, rate-shaped dispatch of provider calls

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

type Spacing = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Error)]
#[error("dispatch queue is closed")]
pub struct QueueClosed;

/// Slot for one in-flight call; the slot frees when dropped
#[derive(Debug)]
pub struct DispatchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Gate that every provider dispatch passes through
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    /// Wait for a free slot and the minimum spacing since the last dispatch
    async fn acquire(&self) -> Result<DispatchPermit, QueueClosed>;

    /// Callers currently waiting for a slot
    fn waiting(&self) -> usize {
        0
    }
}

/// Semaphore-gated queue with a minimum inter-dispatch delay
///
/// Spacing is a one-cell quota replenished once per delay, so a burst of
/// callers leaves one dispatch per period. A zero delay disables it.
pub struct BoundedQueue {
    slots: Arc<Semaphore>,
    spacing: Option<Arc<Spacing>>,
    waiting: AtomicUsize,
}

impl BoundedQueue {
    pub fn new(limit: usize, spacing: Duration) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(limit.max(1))),
            spacing: Quota::with_period(spacing)
                .map(|quota| Arc::new(RateLimiter::direct(quota))),
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn is_spaced(&self) -> bool {
        self.spacing.is_some()
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

#[async_trait]
impl DispatchQueue for BoundedQueue {
    async fn acquire(&self) -> Result<DispatchPermit, QueueClosed> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let permit = self.slots.clone().acquire_owned().await;
        self.waiting.fetch_sub(1, Ordering::SeqCst);
        let permit = permit.map_err(|_| QueueClosed)?;

        if let Some(spacing) = &self.spacing {
            spacing.until_ready().await;
        }

        Ok(DispatchPermit { _permit: permit })
    }

    fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
