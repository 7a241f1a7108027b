// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agents::{CoordinationOutcome, Coordinator};
use handlers::{incidents, teams};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    /// Most recent successful outcome of this process
    pub latest: Arc<RwLock<Option<CoordinationOutcome>>>,
}

impl AppState {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            latest: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build the application router without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(teams::health_check))
        // Incident routes
        .route("/api/incidents", post(incidents::create_incident))
        .route("/api/incidents/latest", get(incidents::latest_incident))
        // Team routes
        .route("/api/teams", get(teams::list_teams))
        // Shared state
        .with_state(state)
}
