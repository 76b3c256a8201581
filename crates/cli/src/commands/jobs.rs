// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jm unmatched` - Jobs still waiting for a match

use anyhow::Result;
use jm_storage::JobStore;

use crate::context::DataDir;
use crate::output::{self, OutputFormat};

pub fn unmatched(dir: &DataDir, format: OutputFormat) -> Result<()> {
    let ids = dir.store().unmatched_job_ids()?;
    output::print_list(&ids, format, "No unmatched jobs");
    Ok(())
}
