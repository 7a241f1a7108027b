use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::domain::incident::ValidationError;

/// Errors that end a coordination run
///
/// Callers can tell bad input (`Validation`) apart from broken internal
/// invariants (`GraphIntegrity`) and from a run with nobody to ask.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("invalid incident: {0}")]
    Validation(#[from] ValidationError),

    #[error("task graph integrity violated: {0}")]
    GraphIntegrity(#[from] GraphIntegrityError),

    #[error("no usable teams ({excluded} team profile(s) excluded)")]
    NoUsableTeams { excluded: usize },
}

pub type CoordinationResult<T> = Result<T, CoordinationError>;

/// A dependency pointing at a task id nobody proposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    pub task_id: String,
    pub missing: String,
}

impl fmt::Display for DanglingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.task_id, self.missing)
    }
}

/// Structural problems in the proposal set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphIntegrityError {
    #[error("duplicate task id {0:?}")]
    DuplicateTaskId(String),

    #[error("task {0:?} depends on itself")]
    SelfDependency(String),

    #[error("unknown dependencies: {}", join_dangling(.0))]
    DanglingDependencies(Vec<DanglingDependency>),

    #[error("dependency cycle: {}", .path.join(" -> "))]
    DependencyCycle { path: Vec<String> },
}

fn join_dangling(dangling: &[DanglingDependency]) -> String {
    dangling
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failures of the optional enhancement collaborator
///
/// Never fatal: the agent logs them and keeps its rule-based tasks.
#[derive(Debug, Error)]
pub enum EnhancementError {
    #[error("enhancement timed out after {0:?}")]
    Timeout(Duration),

    #[error("enhancement request failed: {0}")]
    Transport(String),

    #[error("enhancement service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed enhancement response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for EnhancementError {
    fn from(err: serde_json::Error) -> Self {
        EnhancementError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_dependencies_are_all_listed() {
        let err = GraphIntegrityError::DanglingDependencies(vec![
            DanglingDependency {
                task_id: "ops_2".to_string(),
                missing: "ghost_1".to_string(),
            },
            DanglingDependency {
                task_id: "ops_3".to_string(),
                missing: "ghost_9".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "unknown dependencies: ops_2 -> ghost_1, ops_3 -> ghost_9"
        );
    }

    #[test]
    fn cycle_message_shows_path() {
        let err = GraphIntegrityError::DependencyCycle {
            path: vec!["a_1".into(), "a_2".into(), "a_1".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle: a_1 -> a_2 -> a_1");
    }

    #[test]
    fn validation_error_converts_into_coordination_error() {
        let err: CoordinationError = ValidationError::EmptyDescription.into();
        assert!(matches!(err, CoordinationError::Validation(_)));
        assert_eq!(err.to_string(), "invalid incident: incident description is required");
    }

    #[test]
    fn json_error_is_malformed_enhancement() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: EnhancementError = json_err.into();
        assert!(matches!(err, EnhancementError::Malformed(_)));
    }
}
