// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jm - job match CLI

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod commands;
mod context;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, jobs, run, session};
use std::path::PathBuf;

use crate::context::DataDir;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "jm",
    version,
    about = "Job match - score saved jobs against a candidate profile"
)]
struct Cli {
    /// Directory holding settings, profile, jobs and sessions
    #[arg(long, global = true, env = "JM_DATA_DIR", default_value = ".jobmatch")]
    data_dir: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match jobs under a new session
    Run(run::RunArgs),
    /// Show a session's counters and status
    Status {
        /// Session id
        session: String,
    },
    /// Request a cooperative stop of an active session
    Stop {
        /// Session id
        session: String,
    },
    /// List sessions, newest first
    Sessions,
    /// Show the per-job log of a session
    Logs {
        /// Session id
        session: String,
    },
    /// List jobs without a stored match
    Unmatched,
    /// Print the effective matcher settings
    Config,
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging();

    if let Err(e) = dispatch(cli).await {
        eprint!("{}", error::explain(&e));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let dir = DataDir::open(&cli.data_dir)?;
    let format = cli.format;

    match cli.command {
        Commands::Run(args) => run::handle(&dir, args, format).await,
        Commands::Status { session } => session::status(&dir, &session, format),
        Commands::Stop { session } => session::stop(&dir, &session),
        Commands::Sessions => session::list(&dir, format),
        Commands::Logs { session } => session::logs(&dir, &session, format),
        Commands::Unmatched => jobs::unmatched(&dir, format),
        Commands::Config => config::show(&dir, format),
    }
}
