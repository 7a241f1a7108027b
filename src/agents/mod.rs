// Coordination engine
//
// One proposal agent per team scores the incident and proposes tasks; the
// coordinator merges the proposals into a dependency graph and a per-team
// assignment plan.

pub mod coordinator;
pub mod enhancer;
pub mod errors;
pub mod graph_builder;
pub mod planner;
pub mod playbooks;
pub mod prompts;
pub mod proposer;
pub mod scoring;
pub mod types;

// Re-export main types
pub use coordinator::Coordinator;
pub use enhancer::{EnhancementCandidate, EnhancementRequest, Enhancer, NoopEnhancer};
pub use errors::{CoordinationError, CoordinationResult, EnhancementError, GraphIntegrityError};
pub use graph_builder::build_task_graph;
pub use planner::plan_assignments;
pub use proposer::ProposalAgent;
pub use scoring::{RelevanceScore, RelevanceTier, ScoringRules};
pub use types::{AgentSettings, CoordinationOutcome, ExcludedTeam, TeamSummary};
