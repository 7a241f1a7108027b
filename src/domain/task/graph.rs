use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed id of the central incident node
pub const INCIDENT_NODE_ID: &str = "INCIDENT";

/// Incident node importance when no task was proposed
pub const EMPTY_INCIDENT_IMPORTANCE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Incident,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Task contributes to resolving the incident, weighted by importance
    Priority,
    /// Prerequisite task must finish before the dependent task
    Dependency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub importance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    pub label: String,
}

/// Node/edge view linking tasks to the incident and to each other
///
/// Plain data: rendering is left to whoever consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TaskGraph {
    /// Looks up a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the central incident node
    pub fn incident_node(&self) -> Option<&GraphNode> {
        self.node(INCIDENT_NODE_ID)
    }

    /// Iterates over task to incident edges
    pub fn priority_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Priority)
    }

    /// Iterates over prerequisite to task edges
    pub fn dependency_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Dependency)
    }
}
