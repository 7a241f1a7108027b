use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::agents::CoordinationOutcome;
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::incident::IncidentRequest;

const DEFAULT_HOURS_TO_DEADLINE: f64 = 24.0;

fn default_hours() -> f64 {
    DEFAULT_HOURS_TO_DEADLINE
}

/// Request body for reporting an incident
#[derive(Debug, Deserialize)]
pub struct CreateIncidentRequest {
    pub description: String,
    #[serde(default = "default_hours")]
    pub hours_to_deadline: f64,
}

/// Coordinate the response to a new incident
///
/// POST /api/incidents
pub async fn create_incident(
    State(state): State<AppState>,
    payload: Result<Json<CreateIncidentRequest>, JsonRejection>,
) -> Result<Json<CoordinationOutcome>, ApiError> {
    let Json(req) = payload?;

    let now = Utc::now();
    let incident = IncidentRequest::from_hours(req.description, req.hours_to_deadline, now)?;

    let outcome = state.coordinator.coordinate_at(&incident, now).await?;
    info!(
        incident_id = %outcome.incident_id,
        total_tasks = outcome.total_tasks,
        teams_involved = outcome.teams_involved,
        "incident coordinated"
    );

    *state.latest.write().await = Some(outcome.clone());

    Ok(Json(outcome))
}

/// Most recent coordination outcome
///
/// GET /api/incidents/latest
pub async fn latest_incident(
    State(state): State<AppState>,
) -> Result<Json<CoordinationOutcome>, ApiError> {
    state
        .latest
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No incident has been coordinated yet"))
}
