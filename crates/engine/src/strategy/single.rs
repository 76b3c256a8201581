// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One job per provider call

use super::{on_retry, provider_options, BatchResults, JobOutcome, MatchObserver, Recorder};
use super::StrategyContext;
use jm_adapters::{ProviderAdapter, StructuredRequest};
use jm_core::{
    prompt, retry_with_backoff, with_timeout, Clock, ErrorKind, Job, MatchError, MatchResult,
    ProviderError,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Score a single job
///
/// Never fails as a whole: the error, carrying its attempt count, becomes
/// the job's outcome. The shared breaker sees every attempt.
pub async fn match_job<P, C>(ctx: &StrategyContext<P, C>, job: &Job) -> JobOutcome
where
    P: ProviderAdapter,
    C: Clock,
{
    let start = Instant::now();
    let request = StructuredRequest::new(ctx.config.model.clone(), MatchResult::schema())
        .system(prompt::SYSTEM_PROMPT)
        .user(prompt::single_job_prompt(job, &ctx.profile))
        .options(provider_options(&ctx.config));
    let label = format!("match job {}", job.id);

    match guarded_call(ctx, request, &label, MatchResult::from_value).await {
        Ok((result, attempts)) => {
            tracing::debug!(job_id = %job.id, score = result.score, attempts, "job matched");
            JobOutcome::Succeeded {
                result,
                attempts,
                duration: start.elapsed(),
            }
        }
        Err(error) => {
            tracing::warn!(
                job_id = %job.id,
                kind = %error.kind,
                attempts = error.attempts,
                error = %error.message,
                "job failed"
            );
            JobOutcome::failed(error, start.elapsed())
        }
    }
}

/// Process jobs one after another, checking for a stop before each
pub async fn run<P, C>(
    ctx: &StrategyContext<P, C>,
    jobs: Vec<Job>,
    observer: Arc<dyn MatchObserver>,
) -> BatchResults
where
    P: ProviderAdapter,
    C: Clock,
{
    let recorder = Recorder::new(observer);
    let total = jobs.len();

    for (index, job) in jobs.into_iter().enumerate() {
        let _permit = match ctx.queue.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                recorder.record(&job, queue_failure(e));
                continue;
            }
        };
        if recorder.should_stop() {
            tracing::info!(remaining = total - index, "stop requested, halting dispatch");
            break;
        }
        recorder.dispatched(ctx.queue.waiting());
        let outcome = match_job(ctx, &job).await;
        recorder.record(&job, outcome);
    }

    recorder.finish()
}

/// `retry_with_backoff(breaker.execute(with_timeout(provider call)))`
///
/// `decode` runs inside the guard, so a payload that fails validation is
/// classified and recorded on the breaker like any other failure.
pub(crate) async fn guarded_call<P, C, T, F>(
    ctx: &StrategyContext<P, C>,
    request: StructuredRequest,
    label: &str,
    decode: F,
) -> Result<(T, u32), MatchError>
where
    P: ProviderAdapter,
    C: Clock,
    T: Send,
    F: Fn(Value) -> Result<T, ProviderError> + Sync,
{
    let timeout = ctx.config.timeout;
    let decode = &decode;

    retry_with_backoff(
        &ctx.config.retry,
        |_attempt| {
            let request = request.clone();
            async move {
                ctx.breaker
                    .execute(|| {
                        with_timeout(
                            async move {
                                let value = ctx.provider.generate_structured(request).await?;
                                decode(value).map_err(MatchError::from)
                            },
                            timeout,
                            label,
                        )
                    })
                    .await
            }
        },
        |retry| on_retry(&ctx.config, label, retry),
    )
    .await
}

pub(crate) fn queue_failure(err: crate::queue::QueueClosed) -> JobOutcome {
    JobOutcome::failed(
        MatchError::new(ErrorKind::Unknown, err.to_string()),
        Duration::ZERO,
    )
}

#[cfg(test)]
#[path = "single_tests.rs"]
mod tests;
