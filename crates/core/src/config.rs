// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matcher configuration
//!
//! Every tunable of the engine lives here: model selection, batching,
//! concurrency shaping, retry/backoff, per-call timeout and breaker
//! thresholds. Values come from a [`SettingsSource`], usually a TOML file:
//!
//! ```toml
//! [matcher]
//! model = "gpt-4o-mini"
//! concurrency_limit = 5
//! inter_request_delay = "250ms"
//! timeout = "90s"
//!
//! [matcher.retry]
//! max_retries = 4
//!
//! [matcher.circuit_breaker]
//! failure_threshold = 8
//! ```

use crate::circuit::CircuitBreakerConfig;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid matcher configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub model: String,
    /// Forwarded to providers that support reasoning controls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    /// Jobs per provider call in bulk mode
    pub batch_size: usize,
    /// Simultaneous in-flight provider calls
    pub concurrency_limit: usize,
    /// Minimum spacing between dispatches
    #[serde(with = "humantime_serde")]
    pub inter_request_delay: Duration,
    pub bulk_enabled: bool,
    /// Process one job at a time
    pub serialize_operations: bool,
    /// Match freshly scraped jobs without an explicit request
    pub auto_match_after_scrape: bool,
    /// Per provider call, not per batch
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            reasoning_effort: None,
            batch_size: 10,
            concurrency_limit: 3,
            inter_request_delay: Duration::ZERO,
            bulk_enabled: false,
            serialize_operations: false,
            auto_match_after_scrape: false,
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.model.trim().is_empty() {
            return invalid("model must not be empty");
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1");
        }
        if self.concurrency_limit == 0 {
            return invalid("concurrency_limit must be at least 1");
        }
        if self.timeout.is_zero() {
            return invalid("timeout must be positive");
        }
        if self.retry.max_retries == 0 {
            return invalid("retry.max_retries must be at least 1");
        }
        if self.retry.max_delay < self.retry.base_delay {
            return invalid("retry.max_delay must not be below retry.base_delay");
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return invalid("circuit_breaker.failure_threshold must be at least 1");
        }
        if self.circuit_breaker.half_open_max_calls == 0 {
            return invalid("circuit_breaker.half_open_max_calls must be at least 1");
        }
        Ok(())
    }

    /// Parse the `[matcher]` table of a settings document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize, Default)]
        struct SettingsFile {
            #[serde(default)]
            matcher: MatcherConfig,
        }

        let file: SettingsFile = toml::from_str(contents)?;
        file.matcher.validate()?;
        Ok(file.matcher)
    }
}

/// Where the engine reads its configuration from on every run
pub trait SettingsSource: Clone + Send + Sync + 'static {
    fn matcher_config(&self) -> Result<MatcherConfig, ConfigError>;
}

/// Settings read from a TOML file; a missing file means defaults
#[derive(Debug, Clone)]
pub struct TomlSettings {
    path: PathBuf,
}

impl TomlSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsSource for TomlSettings {
    fn matcher_config(&self) -> Result<MatcherConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => MatcherConfig::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                Ok(MatcherConfig::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Fixed in-memory settings
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub MatcherConfig);

impl SettingsSource for StaticSettings {
    fn matcher_config(&self) -> Result<MatcherConfig, ConfigError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
