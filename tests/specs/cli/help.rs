//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();

    let run = temp.jm().args(&["--help"]).passes();
    for command in [
        "run",
        "status",
        "stop",
        "sessions",
        "logs",
        "unmatched",
        "config",
    ] {
        assert!(run.stdout().contains(command), "missing {}", command);
    }
}

#[test]
fn run_help_describes_unmatched_flag() {
    let temp = Project::empty();

    temp.jm()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--unmatched")
        .stdout_has("--company");
}
