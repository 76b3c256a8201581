// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jm config` - Effective matcher settings after defaults are applied

use anyhow::Result;
use jm_core::{MatcherConfig, SettingsSource};
use serde::Serialize;

use crate::context::DataDir;
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SettingsDocument<'a> {
    matcher: &'a MatcherConfig,
}

pub fn show(dir: &DataDir, format: OutputFormat) -> Result<()> {
    let config = dir.settings().matcher_config()?;
    let document = SettingsDocument { matcher: &config };
    match format {
        OutputFormat::Text => print!("{}", toml::to_string(&document)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
    }
    Ok(())
}
