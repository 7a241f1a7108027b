use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::task::{TaskProposal, TeamAssignment};

/// Group proposals per team and order them by priority
///
/// Teams come out by descending average importance, ties by ascending team
/// name. Each team's tasks are ordered by descending importance, ties by
/// ascending task id, so the plan never depends on insertion order.
pub fn plan_assignments(proposals: &[TaskProposal]) -> Vec<TeamAssignment> {
    let mut by_team: BTreeMap<&str, Vec<TaskProposal>> = BTreeMap::new();
    for proposal in proposals {
        by_team
            .entry(proposal.team_name.as_str())
            .or_default()
            .push(proposal.clone());
    }

    let mut assignments: Vec<TeamAssignment> = by_team
        .into_iter()
        .map(|(team_name, mut tasks)| {
            tasks.sort_by(compare_tasks);

            let total_estimated_hours = tasks.iter().map(|t| t.estimated_hours).sum();
            let importance_sum: Decimal = tasks.iter().map(|t| Decimal::from(t.importance)).sum();
            let average_importance =
                (importance_sum / Decimal::from(tasks.len())).round_dp(2);

            TeamAssignment {
                team_name: team_name.to_string(),
                task_count: tasks.len(),
                total_estimated_hours,
                average_importance,
                tasks,
            }
        })
        .collect();

    assignments.sort_by(|a, b| {
        b.average_importance
            .cmp(&a.average_importance)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });

    assignments
}

fn compare_tasks(a: &TaskProposal, b: &TaskProposal) -> Ordering {
    b.importance
        .cmp(&a.importance)
        .then_with(|| a.task_id.cmp(&b.task_id))
}
