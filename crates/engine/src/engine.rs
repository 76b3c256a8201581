// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Match orchestrator
//!
//! A run resolves configuration, creates or attaches to a session, builds
//! one circuit breaker for the run, drives the selected strategy and
//! reconciles the final totals into the session. A stop that lands while
//! jobs are in flight always wins: the final write is conditional and the
//! summary then reflects what the stop recorded.

use crate::error::{EngineError, TrackerError};
use crate::queue::BoundedQueue;
use crate::strategy::{JobOutcome, MatchObserver, StrategyContext, StrategyKind};
use crate::tracker::{
    missing_job_outcome, placeholder_job, ProgressPhase, ProgressSnapshot, ProgressTracker,
    SessionTracker,
};
use jm_adapters::ProviderAdapter;
use jm_core::{
    dedupe_job_ids, CircuitBreaker, Clock, ErrorKind, IdGen, Job, JobId, JobMatch, MatchError, MatchLogEntry,
    MatchSession, SessionCounters, SessionId, SettingsSource, TriggerSource,
};
use jm_storage::{JobStore, MatchStore, ProfileSource};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// External collaborators of the engine
pub struct MatchEngineDeps<P, S, St> {
    pub provider: P,
    pub settings: S,
    /// Sessions, logs, jobs and the candidate profile
    pub store: St,
}

/// How a batch was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub trigger_source: TriggerSource,
    pub company_id: Option<String>,
    /// Attach to a pre-created session instead of creating one
    pub session_id: Option<SessionId>,
}

impl MatchOptions {
    pub fn new(trigger_source: TriggerSource) -> Self {
        Self {
            trigger_source,
            company_id: None,
            session_id: None,
        }
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// Totals returned to the caller of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub session_id: SessionId,
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl MatchSummary {
    fn from_session(session: &MatchSession) -> Self {
        Self {
            session_id: session.id.clone(),
            total: session.jobs_total,
            succeeded: session.jobs_succeeded,
            failed: session.jobs_failed,
        }
    }
}

/// A run started in the background
pub struct BackgroundMatch {
    pub session_id: SessionId,
    handle: JoinHandle<Result<MatchSummary, EngineError>>,
}

impl BackgroundMatch {
    /// Wait for the run to finish
    pub async fn wait(self) -> Result<MatchSummary, EngineError> {
        self.handle
            .await
            .map_err(|e| EngineError::Background(e.to_string()))?
    }
}

/// Orchestrates match runs
#[derive(Clone)]
pub struct MatchEngine<P, S, St, C, I> {
    provider: P,
    settings: S,
    store: St,
    clock: C,
    tracker: SessionTracker<St, C, I>,
    progress: Arc<Mutex<HashMap<SessionId, ProgressTracker>>>,
}

impl<P, S, St, C, I> MatchEngine<P, S, St, C, I>
where
    P: ProviderAdapter,
    S: SettingsSource,
    St: MatchStore + JobStore + ProfileSource,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: MatchEngineDeps<P, S, St>, clock: C, id_gen: I) -> Self {
        let tracker = SessionTracker::new(deps.store.clone(), clock.clone(), id_gen);
        Self {
            provider: deps.provider,
            settings: deps.settings,
            store: deps.store,
            clock,
            tracker,
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn tracker(&self) -> &SessionTracker<St, C, I> {
        &self.tracker
    }

    /// Match `job_ids` under a tracked session
    ///
    /// Per-job failures are recorded on the session; only session-level
    /// failures (configuration, persistence, missing profile) are returned
    /// as errors.
    pub async fn match_with_tracking(
        &self,
        job_ids: Vec<JobId>,
        options: MatchOptions,
    ) -> Result<MatchSummary, EngineError> {
        let job_ids = dedupe_job_ids(job_ids);
        let config = match self.settings.matcher_config() {
            Ok(config) => config,
            Err(e) => {
                if let Some(id) = &options.session_id {
                    self.fail_session(id);
                }
                return Err(e.into());
            }
        };

        let session = match &options.session_id {
            Some(id) => self.tracker.attach(id)?,
            None => {
                let id = self.tracker.create_match_session(
                    &job_ids,
                    options.trigger_source,
                    options.company_id.clone(),
                )?;
                self.tracker
                    .get_status(&id)?
                    .ok_or(TrackerError::SessionNotFound(id))?
            }
        };

        if session.status.is_terminal() {
            tracing::info!(
                session_id = %session.id,
                status = %session.status,
                "session ended before matching started"
            );
            return Ok(MatchSummary::from_session(&session));
        }

        let progress = self.tracker.create_progress_tracker(&session.id);
        self.progress_registry()
            .insert(session.id.clone(), progress.clone());

        let result = self.run_session(&session.id, job_ids, config, &progress).await;

        progress.complete();
        self.progress_registry().remove(&session.id);
        result
    }

    async fn run_session(
        &self,
        session_id: &SessionId,
        job_ids: Vec<JobId>,
        config: jm_core::MatcherConfig,
        progress: &ProgressTracker,
    ) -> Result<MatchSummary, EngineError> {
        let profile = match self.store.load_profile() {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::error!(session_id = %session_id, "no candidate profile, failing session");
                self.fail_session(session_id);
                return Err(EngineError::ProfileMissing);
            }
            Err(e) => {
                self.fail_session(session_id);
                return Err(e.into());
            }
        };

        let observer = Arc::new(EngineObserver {
            tracker: self.tracker.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            session_id: session_id.clone(),
            model: config.model.clone(),
            progress: progress.clone(),
            base: Mutex::new(SessionCounters::default()),
        });

        let total = u32::try_from(job_ids.len()).unwrap_or(u32::MAX);
        let jobs = self.load_jobs(job_ids, &observer);

        let kind = StrategyKind::select(&config, jobs.len());
        let queue = BoundedQueue::new(kind.concurrency(&config), config.inter_request_delay);
        let ctx = StrategyContext {
            provider: self.provider.clone(),
            breaker: Arc::new(CircuitBreaker::new(
                config.circuit_breaker.clone(),
                self.clock.clone(),
            )),
            config: Arc::new(config),
            profile: Arc::new(profile),
            queue: Arc::new(queue),
        };

        progress.set_phase(ProgressPhase::Matching);
        tracing::info!(
            session_id = %session_id,
            strategy = %kind,
            jobs = jobs.len(),
            "matching started"
        );
        let results = kind.run(&ctx, jobs, observer.clone()).await;

        progress.set_phase(ProgressPhase::Finalizing);
        let counters = observer.combined(&results.counters());
        progress.set_stats(counters);

        if self.tracker.finalize(session_id, counters)? {
            return Ok(MatchSummary {
                session_id: session_id.clone(),
                total,
                succeeded: counters.jobs_succeeded,
                failed: counters.jobs_failed,
            });
        }

        let session = self
            .tracker
            .get_status(session_id)?
            .ok_or_else(|| TrackerError::SessionNotFound(session_id.clone()))?;
        Ok(MatchSummary::from_session(&session))
    }

    /// Resolve ids to jobs; unknown or unreadable ones are recorded as failed
    fn load_jobs(&self, job_ids: Vec<JobId>, observer: &EngineObserver<St, C, I>) -> Vec<Job> {
        let mut jobs = Vec::with_capacity(job_ids.len());
        for id in job_ids {
            match self.store.get_job(&id) {
                Ok(Some(job)) => jobs.push(job),
                Ok(None) => {
                    tracing::warn!(job_id = %id, "job not found");
                    observer.record_unprocessed(&id, missing_job_outcome(&id));
                }
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "failed to load job");
                    let error =
                        MatchError::new(ErrorKind::Unknown, format!("failed to load job: {}", e));
                    observer.record_unprocessed(&id, JobOutcome::failed(error, Duration::ZERO));
                }
            }
        }
        jobs
    }

    fn fail_session(&self, id: &SessionId) {
        if let Err(e) = self.tracker.fail_session(id) {
            tracing::error!(session_id = %id, error = %e, "failed to mark session failed");
        }
    }

    fn progress_registry(&self) -> MutexGuard<'_, HashMap<SessionId, ProgressTracker>> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Match every unmatched job in the background
    ///
    /// The session exists before this returns, so callers can poll it at
    /// once. `None` when there is nothing to match.
    pub fn start_match_unmatched(&self) -> Result<Option<BackgroundMatch>, EngineError> {
        let job_ids = self.get_unmatched_job_ids()?;
        if job_ids.is_empty() {
            tracing::info!("no unmatched jobs");
            return Ok(None);
        }

        let trigger = TriggerSource::MatchUnmatched;
        let session_id = self.tracker.create_match_session(&job_ids, trigger, None)?;
        let options = MatchOptions::new(trigger).with_session(session_id.clone());
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            let result = engine.match_with_tracking(job_ids, options).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "background match failed");
            }
            result
        });

        Ok(Some(BackgroundMatch { session_id, handle }))
    }

    /// Match freshly scraped jobs when auto-matching is enabled
    pub async fn match_scraped_jobs(
        &self,
        job_ids: Vec<JobId>,
        company_id: Option<String>,
    ) -> Result<Option<MatchSummary>, EngineError> {
        let config = self.settings.matcher_config()?;
        if !config.auto_match_after_scrape {
            tracing::debug!(jobs = job_ids.len(), "auto-match after scrape disabled");
            return Ok(None);
        }
        if job_ids.is_empty() {
            return Ok(None);
        }

        let options = match company_id {
            Some(company) => MatchOptions::new(TriggerSource::CompanyRefresh).with_company(company),
            None => MatchOptions::new(TriggerSource::Scheduler),
        };
        Ok(Some(self.match_with_tracking(job_ids, options).await?))
    }

    pub fn create_match_session(
        &self,
        job_ids: &[JobId],
        trigger: TriggerSource,
    ) -> Result<SessionId, EngineError> {
        Ok(self.tracker.create_match_session(job_ids, trigger, None)?)
    }

    pub fn get_unmatched_job_ids(&self) -> Result<Vec<JobId>, EngineError> {
        Ok(self.store.unmatched_job_ids()?)
    }

    pub fn get_match_session_status(
        &self,
        id: &SessionId,
    ) -> Result<Option<MatchSession>, EngineError> {
        Ok(self.tracker.get_status(id)?)
    }

    /// Stop an active session; `false` when it had already ended
    pub fn stop_session(&self, id: &SessionId) -> Result<bool, EngineError> {
        Ok(self.tracker.stop_session(id)?)
    }

    pub fn list_sessions(&self) -> Result<Vec<MatchSession>, EngineError> {
        Ok(self.store.list_sessions()?)
    }

    pub fn session_logs(&self, id: &SessionId) -> Result<Vec<MatchLogEntry>, EngineError> {
        Ok(self.store.session_logs(id)?)
    }

    /// Live progress of a run in this process
    pub fn progress(&self, id: &SessionId) -> Option<ProgressSnapshot> {
        self.progress_registry().get(id).map(ProgressTracker::snapshot)
    }
}

/// Wires strategy callbacks into the session, the job store and progress
struct EngineObserver<St, C, I> {
    tracker: SessionTracker<St, C, I>,
    store: St,
    clock: C,
    session_id: SessionId,
    model: String,
    progress: ProgressTracker,
    /// Jobs settled before the strategy ran
    base: Mutex<SessionCounters>,
}

impl<St, C, I> EngineObserver<St, C, I>
where
    St: MatchStore + JobStore,
    C: Clock,
    I: IdGen,
{
    fn combined(&self, counters: &SessionCounters) -> SessionCounters {
        let base = *self.base.lock().unwrap_or_else(|e| e.into_inner());
        SessionCounters::from_totals(
            base.jobs_succeeded + counters.jobs_succeeded,
            base.jobs_failed + counters.jobs_failed,
            base.error_count + counters.error_count,
        )
    }

    fn record_unprocessed(&self, id: &JobId, outcome: JobOutcome) {
        if let Err(e) = self.on_result(&placeholder_job(id), &outcome) {
            tracing::warn!(job_id = %id, error = %e, "failed to record job");
        }
        {
            let mut base = self.base.lock().unwrap_or_else(|e| e.into_inner());
            crate::strategy::tally(&mut base, &outcome);
        }
        self.on_progress(&SessionCounters::default());
    }
}

impl<St, C, I> MatchObserver for EngineObserver<St, C, I>
where
    St: MatchStore + JobStore,
    C: Clock,
    I: IdGen,
{
    fn should_stop(&self) -> bool {
        self.tracker.should_stop(&self.session_id)
    }

    fn on_result(&self, job: &Job, outcome: &JobOutcome) -> Result<(), EngineError> {
        if let JobOutcome::Succeeded { result, .. } = outcome {
            let record = JobMatch {
                result: result.clone(),
                model: self.model.clone(),
                matched_at: self.clock.utc_now(),
            };
            if let Err(e) = self.store.save_match(&job.id, &record) {
                tracing::warn!(job_id = %job.id, error = %e, "failed to save match result");
            }
        }
        let entry = self
            .tracker
            .log_entry(&self.session_id, &job.id, outcome, &self.model);
        self.tracker.record_log(&entry)?;
        Ok(())
    }

    fn on_progress(&self, counters: &SessionCounters) {
        let combined = self.combined(counters);
        self.progress.set_stats(combined);
        match self.tracker.update_if_active(&self.session_id, combined) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(session_id = %self.session_id, "progress not saved, session ended or ahead")
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to save progress")
            }
        }
    }

    fn on_dispatch(&self, waiting: usize) {
        self.progress.set_queue_position(waiting);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
