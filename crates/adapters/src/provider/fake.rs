// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted provider for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProviderAdapter, StructuredRequest};
use async_trait::async_trait;
use jm_core::ProviderError;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake answers with
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// A valid match result; for bulk requests one entry per job in the prompt
    Auto,
    /// A valid match result with this score
    Score(f64),
    Value(Value),
    Error(ProviderError),
    /// Never completes
    Hang,
}

struct Rule {
    marker: String,
    queued: VecDeque<FakeReply>,
    repeat: FakeReply,
}

struct FakeState {
    rules: Vec<Rule>,
    default: FakeReply,
    omitted: HashSet<String>,
    calls: Vec<StructuredRequest>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Provider whose replies are scripted per prompt marker
///
/// A rule applies when its marker is a substring of the user prompt; the
/// first matching rule wins. Queued replies are consumed in order, after
/// which the last one repeats.
#[derive(Clone)]
pub struct FakeProvider {
    inner: Arc<Mutex<FakeState>>,
    latency: Duration,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                rules: Vec::new(),
                default: FakeReply::Auto,
                omitted: HashSet::new(),
                calls: Vec::new(),
                in_flight: 0,
                max_in_flight: 0,
            })),
            latency: Duration::ZERO,
        }
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker that selects the single-job prompt for a job title
    pub fn title_marker(title: &str) -> String {
        format!("Title: {}\n", title)
    }

    /// A schema-valid match result
    pub fn match_json(score: f64) -> Value {
        json!({
            "score": score,
            "reasons": [{
                "category": "skills",
                "explanation": "core stack overlaps",
                "impact": "positive"
            }],
            "matched_skills": ["rust"],
            "missing_skills": [],
            "recommendations": ["highlight systems work"]
        })
    }

    /// Simulated time spent in every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Always answer `reply` to prompts containing `marker`
    pub fn respond(&self, marker: impl Into<String>, reply: FakeReply) {
        self.respond_seq(marker, vec![reply]);
    }

    /// Answer prompts containing `marker` with `replies` in order
    pub fn respond_seq(&self, marker: impl Into<String>, replies: Vec<FakeReply>) {
        let mut queued: VecDeque<FakeReply> = replies.into();
        let repeat = queued.pop_back().unwrap_or(FakeReply::Auto);
        self.lock().rules.push(Rule {
            marker: marker.into(),
            queued,
            repeat,
        });
    }

    /// Reply for prompts no rule matches
    pub fn set_default(&self, reply: FakeReply) {
        self.lock().default = reply;
    }

    /// Leave this job out of auto-generated bulk responses
    pub fn omit_from_bulk(&self, job_id: impl Into<String>) {
        self.lock().omitted.insert(job_id.into());
    }

    pub fn calls(&self) -> Vec<StructuredRequest> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls whose user prompt contains `marker`
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.user_prompt.contains(marker))
            .count()
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_reply(&self, request: &StructuredRequest) -> FakeReply {
        let mut state = self.lock();
        state.calls.push(request.clone());
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);

        let rule = state
            .rules
            .iter_mut()
            .find(|r| request.user_prompt.contains(&r.marker));
        match rule {
            Some(rule) => rule.queued.pop_front().unwrap_or_else(|| rule.repeat.clone()),
            None => state.default.clone(),
        }
    }

    fn auto_reply(&self, request: &StructuredRequest, score: f64) -> Value {
        let is_bulk = request.schema["properties"].get("matches").is_some();
        if !is_bulk {
            return Self::match_json(score);
        }
        let state = self.lock();
        let matches: Vec<Value> = request
            .user_prompt
            .lines()
            .filter_map(|line| line.strip_prefix("## Job "))
            .map(str::trim)
            .filter(|id| !state.omitted.contains(*id))
            .map(|id| {
                let mut entry = Self::match_json(score);
                entry["job_id"] = json!(id);
                entry
            })
            .collect();
        json!({ "matches": matches })
    }
}

struct InFlight<'a>(&'a FakeProvider);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

#[async_trait]
impl ProviderAdapter for FakeProvider {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, ProviderError> {
        let reply = self.next_reply(&request);
        let _in_flight = InFlight(self);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            FakeReply::Auto => Ok(self.auto_reply(&request, 75.0)),
            FakeReply::Score(score) => Ok(self.auto_reply(&request, score)),
            FakeReply::Value(value) => Ok(value),
            FakeReply::Error(err) => Err(err),
            FakeReply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
