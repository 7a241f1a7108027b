use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::playbooks::Playbooks;
use super::scoring::ScoringRules;
use crate::domain::task::{TaskGraph, TeamAssignment};
use crate::domain::team::TeamProfile;

/// Default bound on one enhancement call
pub const DEFAULT_ENHANCEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Rules shared read-only by every proposal agent of a coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub scoring: ScoringRules,
    pub playbooks: Playbooks,
    pub enhancement_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            playbooks: Playbooks::default(),
            enhancement_timeout: DEFAULT_ENHANCEMENT_TIMEOUT,
        }
    }
}

/// A team left out of coordination and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTeam {
    /// Team name, or the record's origin when it had no name
    pub team: String,
    pub reason: String,
}

/// Public facts about a registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub team_lead: String,
    pub member_count: usize,
    pub expertise: Vec<String>,
}

impl From<&TeamProfile> for TeamSummary {
    fn from(profile: &TeamProfile) -> Self {
        Self {
            team_name: profile.name().to_string(),
            team_lead: profile.lead().to_string(),
            member_count: profile.members().len(),
            expertise: profile.expertise().iter().cloned().collect(),
        }
    }
}

/// Everything one coordination run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationOutcome {
    /// Fresh per run, for log correlation
    pub incident_id: Uuid,
    pub incident: String,
    pub deadline: DateTime<Utc>,
    pub task_graph: TaskGraph,
    pub assignments: Vec<TeamAssignment>,
    pub total_tasks: usize,
    pub teams_involved: usize,
    #[serde(default)]
    pub excluded_teams: Vec<ExcludedTeam>,
}
