use chrono::Duration;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::enhancer::{accept_candidates, EnhancementRequest, Enhancer, MAX_ENHANCED_TASKS};
use super::errors::EnhancementError;
use super::playbooks::PlaybookEntry;
use super::scoring::{RelevanceScore, RelevanceTier};
use super::types::AgentSettings;
use crate::domain::incident::IncidentRequest;
use crate::domain::task::{TaskProposal, TaskSource, TaskSummary, UNASSIGNED};
use crate::domain::team::{ProfileError, TeamProfile, TeamProfileRecord};

/// Highest importance produced by the rule tables
pub const MAX_RULE_IMPORTANCE: u32 = 11;

const HIGH_TASKS: (usize, usize) = (3, 6);
const MEDIUM_TASKS: (usize, usize) = (2, 3);
const MEDIUM_IMPORTANCE: (u32, u32) = (5, 8);
const LOW_IMPORTANCE_MAX: u32 = 4;
const ENHANCED_LEAD_HOURS: i64 = 2;

/// Agent speaking for one team
///
/// Rates how much an incident concerns its team and proposes tasks
/// accordingly. Holds no mutable state, so one agent can serve concurrent
/// runs.
pub struct ProposalAgent {
    profile: TeamProfile,
    settings: Arc<AgentSettings>,
    enhancer: Arc<dyn Enhancer>,
}

/// A task before ids, assignees and deadlines are settled
#[derive(Debug, Clone)]
struct TaskDraft {
    key: Option<String>,
    description: String,
    importance: u32,
    estimated_hours: Decimal,
    lead_hours: Option<i64>,
    depends_on: Vec<String>,
    source: TaskSource,
    justification: Option<String>,
}

impl TaskDraft {
    fn from_entry(entry: &PlaybookEntry, team_name: &str, importance: u32) -> Self {
        Self {
            key: Some(entry.key.clone()),
            description: entry.describe(team_name),
            importance,
            estimated_hours: entry.estimated_hours,
            lead_hours: entry.lead_hours,
            depends_on: entry.depends_on.clone(),
            source: TaskSource::RuleBased,
            justification: None,
        }
    }
}

impl ProposalAgent {
    /// Create an agent for a validated team profile
    pub fn new(profile: TeamProfile, settings: Arc<AgentSettings>, enhancer: Arc<dyn Enhancer>) -> Self {
        Self {
            profile,
            settings,
            enhancer,
        }
    }

    /// Create an agent from a raw profile record
    ///
    /// # Errors
    /// Returns the `ProfileError` that makes the record unusable.
    pub fn from_record(
        record: TeamProfileRecord,
        settings: Arc<AgentSettings>,
        enhancer: Arc<dyn Enhancer>,
    ) -> Result<Self, ProfileError> {
        let profile = TeamProfile::try_from(record)?;
        Ok(Self::new(profile, settings, enhancer))
    }

    pub fn profile(&self) -> &TeamProfile {
        &self.profile
    }

    pub fn team_name(&self) -> &str {
        self.profile.name()
    }

    /// Rate the incident description against this team
    pub fn relevance(&self, description: &str) -> RelevanceScore {
        self.settings.scoring.score(&self.profile, description)
    }

    /// Propose tasks for an incident
    ///
    /// Always returns at least one proposal. Only the enhancement step can be
    /// non-deterministic, and its failures fall back to the rule-based tasks.
    pub async fn propose(&self, incident: &IncidentRequest) -> Vec<TaskProposal> {
        let score = self.relevance(incident.description());
        for contribution in &score.contributions {
            debug!(team = %self.team_name(), points = contribution.points, reason = ?contribution.reason, "score contribution");
        }

        let mut drafts = self.rule_based_drafts(incident.description(), &score);

        if score.tier() != RelevanceTier::None {
            let enhanced = self.enhance(incident, &drafts).await;
            drafts.extend(enhanced);
        }

        let proposals = self.finalize(incident, drafts);
        info!(
            team = %self.team_name(),
            score = score.total(),
            tier = ?score.tier(),
            tasks = proposals.len(),
            "proposed tasks"
        );
        proposals
    }

    fn rule_based_drafts(&self, description: &str, score: &RelevanceScore) -> Vec<TaskDraft> {
        let total = score.total();
        let playbooks = &self.settings.playbooks;
        let team = self.team_name();

        match score.tier() {
            RelevanceTier::High => {
                let base = (total / 10 + 2).min(6);
                playbooks
                    .select(self.profile.expertise(), description, HIGH_TASKS.0, HIGH_TASKS.1)
                    .into_iter()
                    .map(|entry| {
                        let importance = (base + entry.importance_offset).min(MAX_RULE_IMPORTANCE);
                        TaskDraft::from_entry(entry, team, importance)
                    })
                    .collect()
            }
            RelevanceTier::Medium => {
                let base = MEDIUM_IMPORTANCE.0 + (total - 10) / 4;
                playbooks
                    .select(self.profile.expertise(), description, MEDIUM_TASKS.0, MEDIUM_TASKS.1)
                    .into_iter()
                    .map(|entry| {
                        let importance = (base + entry.importance_offset / 2)
                            .clamp(MEDIUM_IMPORTANCE.0, MEDIUM_IMPORTANCE.1);
                        TaskDraft::from_entry(entry, team, importance)
                    })
                    .collect()
            }
            RelevanceTier::Low => {
                let importance = (1 + total / 3).min(LOW_IMPORTANCE_MAX);
                vec![TaskDraft::from_entry(&playbooks.low_relevance, team, importance)]
            }
            RelevanceTier::None => vec![TaskDraft::from_entry(&playbooks.standby, team, 1)],
        }
    }

    async fn enhance(&self, incident: &IncidentRequest, drafts: &[TaskDraft]) -> Vec<TaskDraft> {
        if !self.enhancer.is_enabled() {
            return Vec::new();
        }

        let request = EnhancementRequest {
            team_name: self.team_name().to_string(),
            incident_description: incident.description().to_string(),
            expertise: self.profile.expertise().iter().cloned().collect(),
            existing_tasks: drafts
                .iter()
                .map(|d| TaskSummary {
                    description: d.description.clone(),
                    importance: d.importance,
                    estimated_hours: d.estimated_hours,
                })
                .collect(),
        };

        let timeout = self.settings.enhancement_timeout;
        let candidates = match tokio::time::timeout(timeout, self.enhancer.suggest(&request)).await {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(err)) => {
                warn!(team = %self.team_name(), error = %err, "enhancement failed, keeping rule-based tasks");
                return Vec::new();
            }
            Err(_) => {
                let err = EnhancementError::Timeout(timeout);
                warn!(team = %self.team_name(), error = %err, "enhancement failed, keeping rule-based tasks");
                return Vec::new();
            }
        };

        let existing: Vec<String> = drafts.iter().map(|d| d.description.clone()).collect();
        let accepted = accept_candidates(&existing, candidates, MAX_ENHANCED_TASKS);
        debug!(team = %self.team_name(), accepted = accepted.len(), "enhanced tasks accepted");

        accepted
            .into_iter()
            .map(|candidate| TaskDraft {
                key: None,
                description: candidate.description,
                // accept_candidates keeps importance within 1..=11
                importance: candidate.importance as u32,
                estimated_hours: candidate.estimated_hours,
                lead_hours: Some(ENHANCED_LEAD_HOURS),
                depends_on: Vec::new(),
                source: TaskSource::Enhanced,
                justification: candidate.justification,
            })
            .collect()
    }

    /// Assign ids, resolve dependency hints, pick assignees and deadlines
    fn finalize(&self, incident: &IncidentRequest, drafts: Vec<TaskDraft>) -> Vec<TaskProposal> {
        let slug = self.profile.slug();
        let members = self.profile.members();

        let ids: Vec<String> = (1..=drafts.len()).map(|n| slug.task_id(n)).collect();
        let ids_by_key: HashMap<String, String> = drafts
            .iter()
            .zip(&ids)
            .filter_map(|(draft, id)| draft.key.clone().map(|key| (key, id.clone())))
            .collect();

        drafts
            .into_iter()
            .zip(ids)
            .enumerate()
            .map(|(index, (draft, task_id))| {
                let dependencies = draft
                    .depends_on
                    .iter()
                    .map(|hint| ids_by_key.get(hint).cloned().unwrap_or_else(|| hint.clone()))
                    .collect();

                let assignee = if members.is_empty() {
                    UNASSIGNED.to_string()
                } else {
                    members[index % members.len()].clone()
                };

                let tentative_deadline = match draft.lead_hours {
                    Some(hours) => (incident.deadline() - Duration::hours(hours)).max(incident.reported_at()),
                    None => incident.deadline(),
                };

                TaskProposal {
                    task_id,
                    team_name: self.team_name().to_string(),
                    description: draft.description,
                    importance: draft.importance,
                    estimated_hours: draft.estimated_hours,
                    tentative_deadline,
                    assignee,
                    source: draft.source,
                    dependencies,
                    justification: draft.justification,
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for ProposalAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalAgent")
            .field("team", &self.profile.name())
            .field("expertise", &self.profile.expertise())
            .field("enhancement", &self.enhancer.is_enabled())
            .finish()
    }
}
