use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::proposal::TaskProposal;

/// One team's priority-ordered share of the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub team_name: String,
    pub task_count: usize,
    /// Exact sum of the team's estimated hours
    pub total_estimated_hours: Decimal,
    /// Mean importance rounded to two decimal places
    pub average_importance: Decimal,
    /// Descending importance, ties by ascending task id
    pub tasks: Vec<TaskProposal>,
}
