// Dependency graph construction
//
// Pure translation of a proposal set into nodes and edges, with the
// structural checks that must pass before anyone renders or plans from it.

use std::collections::{HashMap, HashSet};

use super::errors::{DanglingDependency, GraphIntegrityError};
use crate::domain::task::graph::EMPTY_INCIDENT_IMPORTANCE;
use crate::domain::task::{
    EdgeKind, GraphEdge, GraphNode, NodeType, TaskGraph, TaskProposal, INCIDENT_NODE_ID,
};

const INCIDENT_LABEL_CHARS: usize = 50;
const TASK_LABEL_CHARS: usize = 40;

/// Build the task graph for an incident
///
/// # Errors
/// Returns a `GraphIntegrityError` for duplicate task ids, self-dependencies,
/// dependencies on unknown task ids (all of them reported together) or a
/// dependency cycle. No partial graph is produced.
pub fn build_task_graph(
    incident_description: &str,
    proposals: &[TaskProposal],
) -> Result<TaskGraph, GraphIntegrityError> {
    validate(proposals)?;

    let incident_importance = proposals
        .iter()
        .map(|p| p.importance)
        .max()
        .unwrap_or(EMPTY_INCIDENT_IMPORTANCE);

    let mut nodes = Vec::with_capacity(proposals.len() + 1);
    let mut edges = Vec::with_capacity(proposals.len());

    nodes.push(GraphNode {
        id: INCIDENT_NODE_ID.to_string(),
        label: truncate_label(incident_description, INCIDENT_LABEL_CHARS),
        node_type: NodeType::Incident,
        importance: incident_importance,
        team: None,
        assignee: None,
        deadline: None,
    });

    for proposal in proposals {
        nodes.push(GraphNode {
            id: proposal.task_id.clone(),
            label: truncate_label(&proposal.description, TASK_LABEL_CHARS),
            node_type: NodeType::Task,
            importance: proposal.importance,
            team: Some(proposal.team_name.clone()),
            assignee: Some(proposal.assignee.clone()),
            deadline: Some(proposal.tentative_deadline),
        });

        edges.push(GraphEdge {
            from: proposal.task_id.clone(),
            to: INCIDENT_NODE_ID.to_string(),
            kind: EdgeKind::Priority,
            weight: Some(proposal.importance),
            label: format!("Priority: {}", proposal.importance),
        });

        for dependency in &proposal.dependencies {
            edges.push(GraphEdge {
                from: dependency.clone(),
                to: proposal.task_id.clone(),
                kind: EdgeKind::Dependency,
                weight: None,
                label: "depends on".to_string(),
            });
        }
    }

    Ok(TaskGraph { nodes, edges })
}

fn validate(proposals: &[TaskProposal]) -> Result<(), GraphIntegrityError> {
    let mut ids = HashSet::with_capacity(proposals.len());
    for proposal in proposals {
        if proposal.task_id == INCIDENT_NODE_ID || !ids.insert(proposal.task_id.as_str()) {
            return Err(GraphIntegrityError::DuplicateTaskId(proposal.task_id.clone()));
        }
    }

    if let Some(proposal) = proposals
        .iter()
        .find(|p| p.dependencies.contains(&p.task_id))
    {
        return Err(GraphIntegrityError::SelfDependency(proposal.task_id.clone()));
    }

    let dangling: Vec<DanglingDependency> = proposals
        .iter()
        .flat_map(|p| {
            p.dependencies
                .iter()
                .filter(|dep| !ids.contains(dep.as_str()))
                .map(|dep| DanglingDependency {
                    task_id: p.task_id.clone(),
                    missing: dep.clone(),
                })
        })
        .collect();
    if !dangling.is_empty() {
        return Err(GraphIntegrityError::DanglingDependencies(dangling));
    }

    if let Some(path) = find_cycle(proposals) {
        return Err(GraphIntegrityError::DependencyCycle { path });
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search over task -> dependency links
///
/// Returns the first cycle found as a closed path (first id repeated last).
/// Visits tasks in proposal order so the reported cycle is stable.
fn find_cycle(proposals: &[TaskProposal]) -> Option<Vec<String>> {
    let index: HashMap<&str, usize> = proposals
        .iter()
        .enumerate()
        .map(|(i, p)| (p.task_id.as_str(), i))
        .collect();
    let mut marks = vec![Mark::Unvisited; proposals.len()];
    let mut stack = Vec::new();

    for start in 0..proposals.len() {
        if marks[start] == Mark::Unvisited {
            if let Some(cycle) = visit(start, proposals, &index, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit(
    node: usize,
    proposals: &[TaskProposal],
    index: &HashMap<&str, usize>,
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
) -> Option<Vec<String>> {
    marks[node] = Mark::InProgress;
    stack.push(node);

    for dependency in &proposals[node].dependencies {
        let Some(&next) = index.get(dependency.as_str()) else {
            continue;
        };
        match marks[next] {
            Mark::InProgress => {
                let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut path: Vec<String> = stack[start..]
                    .iter()
                    .map(|&n| proposals[n].task_id.clone())
                    .collect();
                path.push(proposals[next].task_id.clone());
                return Some(path);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, proposals, index, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
    None
}

fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
