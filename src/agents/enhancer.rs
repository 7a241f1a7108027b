use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::errors::EnhancementError;
use crate::domain::task::TaskSummary;

/// Highest importance an enhanced task may carry
pub const MAX_ENHANCED_IMPORTANCE: i64 = 11;

/// Most enhanced tasks accepted per team and run
pub const MAX_ENHANCED_TASKS: usize = 3;

/// What the collaborator is told about one team's situation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancementRequest {
    pub team_name: String,
    pub incident_description: String,
    pub expertise: Vec<String>,
    pub existing_tasks: Vec<TaskSummary>,
}

/// A supplementary task suggested by the collaborator, not yet validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementCandidate {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub importance: i64,
    #[serde(default)]
    pub estimated_hours: Decimal,
    #[serde(default)]
    pub justification: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `7` and `7.0` but not `6.5`
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(value) => Ok(value),
        Number::Float(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        Number::Float(value) => Err(D::Error::custom(format!(
            "importance {value} is not a whole number"
        ))),
    }
}

/// Optional source of supplementary task proposals
///
/// Any error is absorbed by the caller; implementations never need to retry.
#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn suggest(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Vec<EnhancementCandidate>, EnhancementError>;

    /// Disabled enhancers are not called at all
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Enhancer used when no collaborator is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnhancer;

#[async_trait]
impl Enhancer for NoopEnhancer {
    async fn suggest(
        &self,
        _request: &EnhancementRequest,
    ) -> Result<Vec<EnhancementCandidate>, EnhancementError> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Keeps the candidates that are safe to turn into proposals
///
/// Drops candidates with a blank description, importance outside 1-11,
/// negative hours, or a description (case-insensitive) already used by an
/// existing or previously accepted task. At most `limit` survive.
pub fn accept_candidates(
    existing_descriptions: &[String],
    candidates: Vec<EnhancementCandidate>,
    limit: usize,
) -> Vec<EnhancementCandidate> {
    let mut seen: HashSet<String> = existing_descriptions
        .iter()
        .map(|d| d.trim().to_lowercase())
        .collect();
    let mut accepted = Vec::new();

    for mut candidate in candidates {
        if accepted.len() >= limit {
            break;
        }

        candidate.description = candidate.description.trim().to_string();
        if candidate.description.is_empty() {
            debug!("dropping enhanced task with empty description");
            continue;
        }
        if !(1..=MAX_ENHANCED_IMPORTANCE).contains(&candidate.importance) {
            debug!(
                description = %candidate.description,
                importance = candidate.importance,
                "dropping enhanced task with out-of-range importance"
            );
            continue;
        }
        if candidate.estimated_hours < Decimal::ZERO {
            debug!(description = %candidate.description, "dropping enhanced task with negative hours");
            continue;
        }
        if !seen.insert(candidate.description.to_lowercase()) {
            debug!(description = %candidate.description, "dropping duplicate enhanced task");
            continue;
        }

        accepted.push(candidate);
    }

    accepted
}
