//! Behavioral specifications for the jm CLI.
//!
//! These tests are black-box: they invoke the CLI binary against a temporary
//! data directory and verify stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/config.rs"]
mod cli_config;
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// session/
#[path = "specs/session/inspect.rs"]
mod session_inspect;

// run/
#[path = "specs/run/offline.rs"]
mod run_offline;
