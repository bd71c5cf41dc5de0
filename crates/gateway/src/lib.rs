//! HTTP gateway for actloop.
//!
//! Exposes the agent loop as an SSE chat endpoint plus a few read-only views
//! of the workspace and the tool registry, and serves a small browser UI.
//!
//! Built on Axum. One `AgentLoop` is shared by every request; each chat
//! request gets its own run and its own event channel.

pub mod api;
pub mod frontend;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use actloop_agent::AgentLoop;
use actloop_config::AppConfig;
use actloop_core::tool::ToolRegistry;
use actloop_tools::Workspace;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub tools: Arc<ToolRegistry>,
    pub workspace: Workspace,
    /// Capacity of each run's event channel
    pub event_buffer: usize,
    pub model: String,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/chat", post(api::chat_handler))
        .route("/api/workspace/files", get(api::list_files_handler))
        .route("/api/workspace/file/{*path}", get(api::read_file_handler))
        .route("/api/tools", get(api::tools_handler))
        .route("/api/health", get(api::health_handler))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the shared state from configuration.
pub fn build_state(config: &AppConfig) -> actloop_core::Result<SharedState> {
    let provider = actloop_providers::build_from_config(config)?;
    let tools = Arc::new(actloop_tools::default_registry(&config.tools)?);
    let agent = Arc::new(AgentLoop::from_config(provider, tools.clone(), config));

    Ok(Arc::new(GatewayState {
        agent,
        tools,
        workspace: Workspace::new(&config.tools.workspace),
        event_buffer: config.agent.event_buffer,
        model: config.model.clone(),
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;

    info!(
        addr = %addr,
        model = %config.model,
        workspace = %config.tools.workspace.display(),
        tools = state.tools.len(),
        "Gateway starting"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actloop_core::{Error, ProviderError};

    #[test]
    fn state_requires_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.tools.workspace = dir.path().to_path_buf();

        let err = build_state(&config).err().unwrap();
        assert!(matches!(err, Error::Provider(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn state_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".into());
        config.tools.workspace = dir.path().join("ws");
        config.agent.event_buffer = 32;

        let state = build_state(&config).unwrap();
        assert_eq!(state.tools.len(), 6);
        assert_eq!(state.event_buffer, 32);
        assert_eq!(state.agent.max_iterations(), config.agent.max_iterations);
        assert!(dir.path().join("ws").is_dir());
    }
}
