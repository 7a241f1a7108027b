// Task domain module
// Proposals produced by team agents and the views derived from them

pub mod assignment;
pub mod graph;
pub mod proposal;

pub use assignment::TeamAssignment;
pub use graph::{EdgeKind, GraphEdge, GraphNode, NodeType, TaskGraph, INCIDENT_NODE_ID};
pub use proposal::{TaskProposal, TaskSource, TaskSummary, UNASSIGNED};
