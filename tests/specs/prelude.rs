//! Shared harness for CLI specs

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Settings that keep retry paths fast
pub const FAST_SETTINGS: &str = r#"
[matcher]
concurrency_limit = 1

[matcher.retry]
max_retries = 2
base_delay = "1ms"
max_delay = "2ms"
max_jitter = "0ms"
"#;

/// An endpoint nothing listens on
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/v1";

/// A temporary data directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Data directory with a profile and the given `(id, title)` jobs
    pub fn with_jobs(jobs: &[(&str, &str)]) -> Self {
        let project = Self::empty();
        project.file(
            "profile.json",
            r#"{"name": "Sam", "skills": ["rust", "tokio"]}"#,
        );
        for (id, title) in jobs {
            project.job(id, title);
        }
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, contents: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn job(&self, id: &str, title: &str) {
        let job = serde_json::json!({
            "id": id,
            "title": title,
            "description": "Build services",
        });
        self.file(&format!("jobs/{}.json", id), &job.to_string());
    }

    /// `jm` pointed at this data directory with no provider credentials
    pub fn jm(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("jm").unwrap();
        cmd.env("JM_DATA_DIR", self.path())
            .env("RUST_LOG", "warn")
            .env_remove("OPENAI_API_KEY")
            .env_remove("OPENAI_BASE_URL");
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output.clone());
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            run.stdout,
            run.stderr
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output.clone());
        assert!(
            !output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout,
            run.stderr
        );
        run
    }
}

pub struct RunAssert {
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly has {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {:?}:\n{}",
            needle,
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
