// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Many single-job calls under the dispatch queue

use super::single::{match_job, queue_failure};
use super::{BatchResults, MatchObserver, Recorder, StrategyContext};
use jm_adapters::ProviderAdapter;
use jm_core::{Clock, Job};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Run every job as its own task and wait for all of them to settle
///
/// Jobs that had not started when a stop was requested are left out of the
/// results.
pub async fn run<P, C>(
    ctx: &StrategyContext<P, C>,
    jobs: Vec<Job>,
    observer: Arc<dyn MatchObserver>,
) -> BatchResults
where
    P: ProviderAdapter,
    C: Clock,
{
    let recorder = Arc::new(Recorder::new(observer));
    let mut tasks = JoinSet::new();

    for job in jobs {
        let ctx = ctx.clone();
        let recorder = Arc::clone(&recorder);
        tasks.spawn(async move {
            let _permit = match ctx.queue.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    recorder.record(&job, queue_failure(e));
                    return;
                }
            };
            if recorder.should_stop() {
                tracing::debug!(job_id = %job.id, "stop requested, skipping job");
                return;
            }
            recorder.dispatched(ctx.queue.waiting());
            let outcome = match_job(&ctx, &job).await;
            recorder.record(&job, outcome);
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "match task aborted");
        }
    }

    recorder.finish()
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
