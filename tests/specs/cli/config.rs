//! Settings specs

use crate::prelude::*;

#[test]
fn config_shows_defaults_without_settings_file() {
    let temp = Project::empty();

    temp.jm()
        .args(&["config"])
        .passes()
        .stdout_has("[matcher]")
        .stdout_has("model = \"gpt-4o-mini\"")
        .stdout_has("concurrency_limit = 3");
}

#[test]
fn config_reflects_settings_file() {
    let temp = Project::empty();
    temp.file("matcher.toml", FAST_SETTINGS);

    let run = temp.jm().args(&["--format", "json", "config"]).passes();
    let json = run.json();

    assert_eq!(json["matcher"]["concurrency_limit"], 1);
    assert_eq!(json["matcher"]["retry"]["max_retries"], 2);
}

#[test]
fn invalid_settings_are_rejected() {
    let temp = Project::empty();
    temp.file("matcher.toml", "[matcher]\nconcurrency_limit = 0\n");

    temp.jm()
        .args(&["config"])
        .fails()
        .stderr_has("Matcher settings are invalid")
        .stderr_has("matcher.toml");
}
