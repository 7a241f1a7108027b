use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Assignee used when a team declares no members
pub const UNASSIGNED: &str = "unassigned";

/// Where a proposal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskSource {
    /// Deterministic playbook rules
    RuleBased,
    /// Supplementary suggestion from the enhancement collaborator
    Enhanced,
}

impl std::fmt::Display for TaskSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskSource::RuleBased => write!(f, "rule-based"),
            TaskSource::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// One candidate action a team proposes for an incident
///
/// Created once by a proposal agent and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProposal {
    /// `<team-slug>_<sequence>`, unique within a run
    pub task_id: String,
    pub team_name: String,
    pub description: String,
    /// Conventionally 1-11
    pub importance: u32,
    pub estimated_hours: Decimal,
    pub tentative_deadline: DateTime<Utc>,
    pub assignee: String,
    pub source: TaskSource,
    /// Task ids that must complete before this one
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

/// Description, importance and effort of an existing task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub description: String,
    pub importance: u32,
    pub estimated_hours: Decimal,
}
