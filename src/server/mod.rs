//! Web dashboard over the swarm control layer
//!
//! A thin presentation shell: every route calls into [`crate::swarm`] and
//! renders or redirects based on the result. No cluster state lives here.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;

use crate::swarm::{AvailabilityController, DockerCli, ScalingController, SwarmClient};

/// Presentation-layer configuration, passed at construction
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address to bind the dashboard to
    pub bind_addr: String,
    /// Port to listen on
    pub port: u16,
    /// Orchestrator binary to invoke
    pub docker_binary: String,
    /// Bound on every orchestrator command
    pub command_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            docker_binary: "docker".to_string(),
            command_timeout: crate::swarm::command::DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl DashboardConfig {
    /// Listen address in `host:port` form
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<SwarmClient<DockerCli>>,
    pub scaler: Arc<ScalingController<DockerCli>>,
    pub availability: Arc<AvailabilityController<DockerCli>>,
}

impl AppState {
    /// Build the control layer from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Self {
        let runner = DockerCli::new(&config.docker_binary, config.command_timeout);
        let client = Arc::new(SwarmClient::new(runner));

        Self {
            scaler: Arc::new(ScalingController::new(client.clone())),
            availability: Arc::new(AvailabilityController::new(client.clone())),
            client,
        }
    }
}

/// Create the dashboard router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/healthz", get(handlers::health))
        .route("/node/{id}", get(handlers::node_detail))
        .route("/service/{id}/scale/{direction}", post(handlers::scale_service))
        .route(
            "/node/{id}/availability/{action}",
            post(handlers::set_node_availability),
        )
        .with_state(state)
}
