// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine and store factory for CLI commands

use anyhow::Result;
use jm_adapters::{OpenAiProvider, TracedProvider};
use jm_core::{SystemClock, TomlSettings, UuidIdGen};
use jm_engine::{MatchEngine, MatchEngineDeps, SessionTracker};
use jm_storage::JsonStore;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "matcher.toml";

pub type Engine =
    MatchEngine<TracedProvider<OpenAiProvider>, TomlSettings, JsonStore, SystemClock, UuidIdGen>;

pub type Tracker = SessionTracker<JsonStore, SystemClock, UuidIdGen>;

/// The on-disk layout every command works against
pub struct DataDir {
    root: PathBuf,
    store: JsonStore,
}

impl DataDir {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let store = JsonStore::open(&root)?;
        Ok(Self { root, store })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn settings(&self) -> TomlSettings {
        TomlSettings::new(self.root.join(SETTINGS_FILE))
    }

    /// Session bookkeeping without a provider
    pub fn tracker(&self) -> Tracker {
        SessionTracker::new(self.store.clone(), SystemClock, UuidIdGen)
    }

    /// Production engine; needs `OPENAI_API_KEY`
    pub fn engine(&self) -> Result<Engine> {
        let provider = TracedProvider::new(OpenAiProvider::from_env()?);
        Ok(MatchEngine::new(
            MatchEngineDeps {
                provider,
                settings: self.settings(),
                store: self.store.clone(),
            },
            SystemClock,
            UuidIdGen,
        ))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
