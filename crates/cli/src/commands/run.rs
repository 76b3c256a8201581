// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jm run [JOB_ID..] [--unmatched]` - Match jobs under a tracked session

use anyhow::Result;
use clap::Args;
use jm_core::{dedupe_job_ids, JobId, SessionId, TriggerSource};
use jm_engine::MatchOptions;
use jm_storage::JobStore;

use crate::context::{DataDir, Tracker};
use crate::error::CliError;
use crate::output::{self, OutputFormat, SummaryView};

#[derive(Args)]
pub struct RunArgs {
    /// Jobs to match
    #[arg(conflicts_with = "unmatched")]
    pub job_ids: Vec<String>,

    /// Match every job without a stored match
    #[arg(long)]
    pub unmatched: bool,

    /// Company the jobs were refreshed for
    #[arg(long)]
    pub company: Option<String>,
}

impl RunArgs {
    fn trigger(&self) -> TriggerSource {
        if self.unmatched {
            TriggerSource::MatchUnmatched
        } else if self.company.is_some() {
            TriggerSource::CompanyRefresh
        } else {
            TriggerSource::Manual
        }
    }
}

pub async fn handle(dir: &DataDir, args: RunArgs, format: OutputFormat) -> Result<()> {
    let job_ids: Vec<JobId> = if args.unmatched {
        dir.store().unmatched_job_ids()?
    } else {
        dedupe_job_ids(args.job_ids.iter().map(|id| JobId::from(id.as_str())).collect())
    };
    if job_ids.is_empty() {
        if args.unmatched {
            println!("No unmatched jobs");
            return Ok(());
        }
        return Err(CliError::nothing_to_match().into());
    }

    let engine = dir.engine()?;
    let trigger = args.trigger();
    let session_id =
        engine
            .tracker()
            .create_match_session(&job_ids, trigger, args.company.clone())?;
    install_stop_handler(engine.tracker().clone(), session_id.clone())?;
    eprintln!("Session {} matching {} job(s)", session_id, job_ids.len());

    let mut options = MatchOptions::new(trigger).with_session(session_id);
    if let Some(company) = args.company {
        options = options.with_company(company);
    }
    let summary = engine.match_with_tracking(job_ids, options).await?;

    output::print(&SummaryView(&summary), format);
    Ok(())
}

/// Ctrl-C asks the running session to stop; in-flight jobs still finish
fn install_stop_handler(tracker: Tracker, session_id: SessionId) -> Result<()> {
    ctrlc::set_handler(move || match tracker.stop_session(&session_id) {
        Ok(true) => eprintln!("Stopping session {}", session_id),
        Ok(false) => {}
        Err(e) => tracing::warn!(session_id = %session_id, error = %e, "stop request failed"),
    })?;
    Ok(())
}
