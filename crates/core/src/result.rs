// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated shape of a provider's scoring answer
//!
//! Providers return loosely-typed JSON. Anything that does not deserialize or
//! carries an out-of-range score is a validation failure, never retried.

use crate::error::ProviderError;
use crate::job::JobId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub category: String,
    pub explanation: String,
    pub impact: ReasonImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0 to 100
    pub score: f64,
    pub reasons: Vec<MatchReason>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
}

impl MatchResult {
    /// JSON schema handed to the provider for single-job calls
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["score", "reasons", "matched_skills", "missing_skills", "recommendations"],
            "properties": {
                "score": { "type": "number", "minimum": 0, "maximum": 100 },
                "reasons": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["category", "explanation", "impact"],
                        "properties": {
                            "category": { "type": "string" },
                            "explanation": { "type": "string" },
                            "impact": { "type": "string", "enum": ["positive", "negative", "neutral"] }
                        }
                    }
                },
                "matched_skills": { "type": "array", "items": { "type": "string" } },
                "missing_skills": { "type": "array", "items": { "type": "string" } },
                "recommendations": { "type": "array", "items": { "type": "string" } }
            }
        })
    }

    /// JSON schema for bulk calls: one entry per job, keyed by `job_id`
    pub fn bulk_schema() -> Value {
        let mut entry = Self::schema();
        if let Some(props) = entry["properties"].as_object_mut() {
            props.insert("job_id".to_string(), json!({ "type": "string" }));
        }
        if let Some(required) = entry["required"].as_array_mut() {
            required.insert(0, json!("job_id"));
        }
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["matches"],
            "properties": {
                "matches": { "type": "array", "items": entry }
            }
        })
    }

    /// Deserialize and range-check a provider payload
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        let result: MatchResult = serde_json::from_value(value).map_err(|e| {
            ProviderError::Validation(format!("response does not match schema: {}", e))
        })?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(ProviderError::Validation(format!(
                "score {} outside 0..=100",
                self.score
            )));
        }
        Ok(())
    }
}

/// Split a bulk payload into per-job results
///
/// Entries that fail validation are dropped individually; the caller falls
/// back to single-job calls for any job missing from the returned list.
pub fn parse_bulk(value: Value) -> Result<Vec<(JobId, MatchResult)>, ProviderError> {
    let entries = match value.get("matches").and_then(Value::as_array) {
        Some(entries) => entries.clone(),
        None => {
            return Err(ProviderError::Validation(
                "bulk response does not match schema: missing `matches` array".to_string(),
            ))
        }
    };

    let mut results = Vec::with_capacity(entries.len());
    for mut entry in entries {
        let Some(job_id) = entry
            .as_object_mut()
            .and_then(|obj| obj.remove("job_id"))
            .and_then(|id| id.as_str().map(JobId::from))
        else {
            tracing::debug!("bulk entry without job_id dropped");
            continue;
        };
        match MatchResult::from_value(entry) {
            Ok(result) => results.push((job_id, result)),
            Err(e) => tracing::debug!(%job_id, error = %e, "bulk entry rejected"),
        }
    }
    Ok(results)
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
