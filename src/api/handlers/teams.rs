use axum::{extract::State, Json};

use crate::agents::TeamSummary;
use crate::api::AppState;

/// List registered teams
///
/// GET /api/teams
pub async fn list_teams(State(state): State<AppState>) -> Json<Vec<TeamSummary>> {
    Json(state.coordinator.team_summaries())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
