// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Several jobs per provider call
//!
//! Jobs are chunked by `batch_size`. A chunk's answer is keyed by job id;
//! any job the answer leaves out, or whose entry fails validation, is
//! rescored on its own. When the batched call fails outright the whole
//! chunk falls back to single calls.

use super::single::{guarded_call, match_job, queue_failure};
use super::{provider_options, BatchResults, JobOutcome, MatchObserver, Recorder, StrategyContext};
use jm_adapters::{ProviderAdapter, StructuredRequest};
use jm_core::result::parse_bulk;
use jm_core::{prompt, Clock, Job, JobId, MatchResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

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

    for chunk in chunk_jobs(jobs, ctx.config.batch_size) {
        let ctx = ctx.clone();
        let recorder = Arc::clone(&recorder);
        tasks.spawn(async move { run_chunk(&ctx, chunk, &recorder).await });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "bulk task aborted");
        }
    }

    recorder.finish()
}

pub(crate) fn chunk_jobs(mut jobs: Vec<Job>, batch_size: usize) -> Vec<Vec<Job>> {
    let batch_size = batch_size.max(1);
    let mut chunks = Vec::with_capacity(jobs.len().div_ceil(batch_size));
    while !jobs.is_empty() {
        let rest = jobs.split_off(batch_size.min(jobs.len()));
        chunks.push(std::mem::replace(&mut jobs, rest));
    }
    chunks
}

async fn run_chunk<P, C>(ctx: &StrategyContext<P, C>, chunk: Vec<Job>, recorder: &Recorder)
where
    P: ProviderAdapter,
    C: Clock,
{
    let _permit = match ctx.queue.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            for job in &chunk {
                recorder.record(job, queue_failure(crate::queue::QueueClosed));
            }
            tracing::warn!(error = %e, jobs = chunk.len(), "chunk not dispatched");
            return;
        }
    };
    if recorder.should_stop() {
        tracing::debug!(jobs = chunk.len(), "stop requested, skipping chunk");
        return;
    }
    recorder.dispatched(ctx.queue.waiting());

    let start = Instant::now();
    let (mut answered, attempts) = if chunk.len() == 1 {
        (HashMap::new(), 0)
    } else {
        score_chunk(ctx, &chunk, recorder).await
    };
    let duration = start.elapsed();

    for job in chunk {
        if let Some(result) = answered.remove(&job.id) {
            recorder.record(
                &job,
                JobOutcome::Succeeded {
                    result,
                    attempts,
                    duration,
                },
            );
            continue;
        }
        if recorder.should_stop() {
            tracing::debug!(job_id = %job.id, "stop requested, skipping fallback");
            return;
        }
        tracing::debug!(job_id = %job.id, "scoring on its own");
        let outcome = match_job(ctx, &job).await;
        recorder.record(&job, outcome);
    }
}

/// One batched call; returns whatever entries validated
async fn score_chunk<P, C>(
    ctx: &StrategyContext<P, C>,
    chunk: &[Job],
    recorder: &Recorder,
) -> (HashMap<JobId, MatchResult>, u32)
where
    P: ProviderAdapter,
    C: Clock,
{
    let request = StructuredRequest::new(ctx.config.model.clone(), MatchResult::bulk_schema())
        .system(prompt::SYSTEM_PROMPT)
        .user(prompt::bulk_prompt(chunk, &ctx.profile))
        .options(provider_options(&ctx.config));
    let label = format!("bulk match of {} jobs", chunk.len());

    match guarded_call(ctx, request, &label, parse_bulk).await {
        Ok((entries, attempts)) => {
            recorder.shared_errors(attempts.saturating_sub(1));
            let answered: HashMap<_, _> = entries.into_iter().collect();
            tracing::debug!(
                jobs = chunk.len(),
                answered = answered.len(),
                attempts,
                "bulk call finished"
            );
            (answered, attempts)
        }
        Err(error) => {
            recorder.shared_errors(error.attempts);
            tracing::warn!(
                jobs = chunk.len(),
                kind = %error.kind,
                attempts = error.attempts,
                error = %error.message,
                "bulk call failed, falling back to single calls"
            );
            (HashMap::new(), 0)
        }
    }
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
