use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use super::enhancer::Enhancer;
use super::errors::{CoordinationError, CoordinationResult};
use super::graph_builder::build_task_graph;
use super::planner::plan_assignments;
use super::proposer::ProposalAgent;
use super::types::{AgentSettings, CoordinationOutcome, ExcludedTeam, TeamSummary};
use crate::domain::incident::IncidentRequest;
use crate::domain::task::TaskProposal;
use crate::domain::team::{ProfileError, TeamProfile, TeamProfileRecord};

/// Coordinator responsible for one incident response at a time
///
/// Owns one proposal agent per usable team profile, asks all of them for
/// proposals, and merges the answers into a task graph and an assignment
/// plan. Profiles that cannot take part are recorded, not fatal.
pub struct Coordinator {
    agents: Vec<ProposalAgent>,
    excluded: Vec<ExcludedTeam>,
}

impl Coordinator {
    /// Create a coordinator from raw profile records
    ///
    /// Records are registered in the given order. A record is excluded when
    /// it fails validation, repeats an earlier team name, or maps to the same
    /// slug as an earlier team (task ids would collide).
    pub fn new(
        records: Vec<TeamProfileRecord>,
        settings: AgentSettings,
        enhancer: Arc<dyn Enhancer>,
    ) -> Self {
        let settings = Arc::new(settings);
        let mut agents = Vec::with_capacity(records.len());
        let mut excluded = Vec::new();
        let mut names = HashSet::new();
        let mut slugs: HashMap<String, String> = HashMap::new();

        for record in records {
            let label = record_label(&record);
            let result = TeamProfile::try_from(record).and_then(|profile| {
                if !names.insert(profile.name().to_lowercase()) {
                    return Err(ProfileError::DuplicateName(profile.name().to_string()));
                }
                if let Some(existing) = slugs.get(profile.slug().as_str()) {
                    return Err(ProfileError::SlugCollision {
                        name: profile.name().to_string(),
                        existing: existing.clone(),
                        slug: profile.slug().to_string(),
                    });
                }
                slugs.insert(profile.slug().to_string(), profile.name().to_string());
                Ok(profile)
            });

            match result {
                Ok(profile) => {
                    info!(team = %profile.name(), expertise = ?profile.expertise(), "registered team");
                    agents.push(ProposalAgent::new(profile, Arc::clone(&settings), Arc::clone(&enhancer)));
                }
                Err(err) => {
                    warn!(team = %label, error = %err, "excluding team profile");
                    excluded.push(ExcludedTeam {
                        team: label,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Self { agents, excluded }
    }

    /// Registered agents, in registration order
    pub fn agents(&self) -> &[ProposalAgent] {
        &self.agents
    }

    /// Profiles left out at construction
    pub fn excluded_teams(&self) -> &[ExcludedTeam] {
        &self.excluded
    }

    pub fn team_summaries(&self) -> Vec<TeamSummary> {
        self.agents
            .iter()
            .map(|agent| TeamSummary::from(agent.profile()))
            .collect()
    }

    /// Coordinate the response to an incident, validated against the current time
    pub async fn coordinate(&self, incident: &IncidentRequest) -> CoordinationResult<CoordinationOutcome> {
        self.coordinate_at(incident, Utc::now()).await
    }

    /// Coordinate the response to an incident as of `now`
    ///
    /// # Errors
    /// * `CoordinationError::Validation` - deadline not after `now`; no agent
    ///   is consulted
    /// * `CoordinationError::NoUsableTeams` - nobody could propose anything
    /// * `CoordinationError::GraphIntegrity` - the merged proposals are
    ///   structurally broken
    pub async fn coordinate_at(
        &self,
        incident: &IncidentRequest,
        now: DateTime<Utc>,
    ) -> CoordinationResult<CoordinationOutcome> {
        incident.validate_at(now)?;

        let incident_id = Uuid::new_v4();
        let span = tracing::info_span!("coordinate", %incident_id);

        async move {
            info!(
                teams = self.agents.len(),
                deadline = %incident.deadline(),
                "collecting task proposals"
            );

            // Agents run concurrently; dropping this future abandons in-flight enhancement calls.
            let per_team = join_all(self.agents.iter().map(|agent| agent.propose(incident))).await;
            let proposals: Vec<TaskProposal> = per_team.into_iter().flatten().collect();

            if proposals.is_empty() {
                return Err(CoordinationError::NoUsableTeams {
                    excluded: self.excluded.len(),
                });
            }

            let task_graph = build_task_graph(incident.description(), &proposals)?;
            let assignments = plan_assignments(&proposals);
            let teams_involved = assignments.len();

            info!(
                total_tasks = proposals.len(),
                teams_involved,
                nodes = task_graph.nodes.len(),
                edges = task_graph.edges.len(),
                "coordination complete"
            );

            Ok(CoordinationOutcome {
                incident_id,
                incident: incident.description().to_string(),
                deadline: incident.deadline(),
                task_graph,
                assignments,
                total_tasks: proposals.len(),
                teams_involved,
                excluded_teams: self.excluded.clone(),
            })
        }
        .instrument(span)
        .await
    }
}

fn record_label(record: &TeamProfileRecord) -> String {
    let name = record.name.trim();
    if !name.is_empty() {
        name.to_string()
    } else {
        record
            .origin
            .clone()
            .unwrap_or_else(|| "<unnamed team>".to_string())
    }
}
