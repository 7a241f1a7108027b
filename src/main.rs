use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use incident_coordinator::agents::{AgentSettings, Coordinator, Enhancer, NoopEnhancer};
use incident_coordinator::api::{self, AppState};
use incident_coordinator::config::AppConfig;
use incident_coordinator::domain::repositories::TeamProfileSource;
use incident_coordinator::infrastructure::{FileTeamProfileSource, HttpEnhancer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Load team profiles
    let source = FileTeamProfileSource::new(&config.team_info_dir);
    let records = source.load_profiles().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "no team profiles loaded, incidents will be rejected");
        Vec::new()
    });

    let enhancer: Arc<dyn Enhancer> = match config.enhancer.clone() {
        Some(enhancer_config) => {
            tracing::info!(model = %enhancer_config.model, "task enhancement enabled");
            Arc::new(HttpEnhancer::new(enhancer_config))
        }
        None => {
            tracing::info!("ENHANCER_API_KEY not set, task enhancement disabled");
            Arc::new(NoopEnhancer)
        }
    };

    let settings = AgentSettings {
        enhancement_timeout: config.enhancement_timeout,
        ..AgentSettings::default()
    };
    let coordinator = Coordinator::new(records, settings, enhancer);
    tracing::info!(
        teams = coordinator.agents().len(),
        excluded = coordinator.excluded_teams().len(),
        "coordinator ready"
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(AppState::new(coordinator))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
