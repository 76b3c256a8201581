// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session inspection and control

use anyhow::Result;
use jm_core::SessionId;
use jm_storage::MatchStore;

use crate::context::DataDir;
use crate::error::CliError;
use crate::output::{self, LogRow, OutputFormat, SessionDetail, SessionRow};

pub fn status(dir: &DataDir, session: &str, format: OutputFormat) -> Result<()> {
    let Some(found) = dir.tracker().get_status(&SessionId::from(session))? else {
        return Err(CliError::session_not_found(session).into());
    };
    output::print(&SessionDetail(&found), format);
    Ok(())
}

pub fn stop(dir: &DataDir, session: &str) -> Result<()> {
    if dir.tracker().stop_session(&SessionId::from(session))? {
        println!("Stop requested for session {}", session);
    } else {
        println!("Session {} has already finished", session);
    }
    Ok(())
}

pub fn list(dir: &DataDir, format: OutputFormat) -> Result<()> {
    let sessions = dir.store().list_sessions()?;
    let rows: Vec<_> = sessions.iter().map(SessionRow).collect();
    output::print_list(&rows, format, "No sessions");
    Ok(())
}

pub fn logs(dir: &DataDir, session: &str, format: OutputFormat) -> Result<()> {
    let id = SessionId::from(session);
    if dir.store().get_session(&id)?.is_none() {
        return Err(CliError::session_not_found(session).into());
    }
    let entries = dir.store().session_logs(&id)?;
    let rows: Vec<_> = entries.iter().map(LogRow).collect();
    output::print_list(&rows, format, "No jobs processed yet");
    Ok(())
}
