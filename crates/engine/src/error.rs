// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the match engine

use jm_core::{ConfigError, SessionId};
use jm_storage::StoreError;
use thiserror::Error;

/// Errors from session bookkeeping
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
}

/// Session-level failures surfaced to the caller
///
/// Per-job failures never show up here; they are recorded on the session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("no candidate profile available")]
    ProfileMissing,
    #[error("background match task failed: {0}")]
    Background(String),
}
