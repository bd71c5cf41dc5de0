//! HTTP handlers.
//!
//! Endpoints:
//!
//! - `POST /api/chat`                  Run a task, stream events over SSE
//! - `GET  /api/workspace/files`       List workspace files
//! - `GET  /api/workspace/file/{path}` Read one workspace file
//! - `GET  /api/tools`                 Tool definitions and the listing
//! - `GET  /api/health`                Liveness

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use actloop_agent::{AgentEvent, EventSink};
use actloop_core::tool::{LISTING_VERSION, ToolDefinition};

use crate::SharedState;

/// Sentinel sent as the last SSE data line.
pub const STREAM_END: &str = "[DONE]";

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    success: bool,
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
}

#[derive(Serialize)]
pub struct FilesResponse {
    success: bool,
    files: Vec<String>,
}

#[derive(Serialize)]
pub struct FileResponse {
    success: bool,
    content: String,
    filename: String,
}

#[derive(Serialize)]
pub struct ToolsResponse {
    version: &'static str,
    tools: Vec<ToolDefinition>,
    listing: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    tools: usize,
}

// ── Chat ──────────────────────────────────────────────────────────────────

/// `POST /api/chat`: start a run and stream its events.
///
/// Each event is one `data:` line of JSON. `error` events are reduced to
/// `{"error": "..."}`, `done` is replaced by the `[DONE]` sentinel.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message must not be empty"));
    }
    info!(message_len = payload.message.len(), "Chat request");

    let (sink, rx) = EventSink::channel(state.event_buffer);
    let agent = state.agent.clone();
    let task = payload.message;
    tokio::spawn(async move {
        let outcome = agent.run_with_events(&task, &sink).await;
        debug!(
            run_id = %outcome.memory.run_id,
            status = ?outcome.status,
            iterations = outcome.iterations,
            "Chat run finished"
        );
    });

    let stream = ReceiverStream::new(rx)
        .filter(|event| !matches!(event, AgentEvent::Done))
        .map(|event| Ok::<_, Infallible>(SseEvent::default().data(event_payload(&event))))
        .chain(tokio_stream::once(Ok(SseEvent::default().data(STREAM_END))));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn event_payload(event: &AgentEvent) -> String {
    match event {
        AgentEvent::Error { message } => serde_json::json!({ "error": message }).to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

// ── Workspace ─────────────────────────────────────────────────────────────

/// `GET /api/workspace/files`
pub async fn list_files_handler(
    State(state): State<SharedState>,
) -> Result<Json<FilesResponse>, ApiError> {
    let workspace = state.workspace.clone();
    match tokio::task::spawn_blocking(move || workspace.list_recursive()).await {
        Ok(Ok(files)) => Ok(Json(FilesResponse {
            success: true,
            files,
        })),
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to list workspace");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list workspace: {e}"),
            ))
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// `GET /api/workspace/file/{*path}`
pub async fn read_file_handler(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let target = state
        .workspace
        .resolve(&path)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    if !target.is_file() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("File not found: {path}"),
        ));
    }

    let content = tokio::fs::read_to_string(&target).await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read file {path}: {e}"),
        )
    })?;
    let filename = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(path);

    Ok(Json(FileResponse {
        success: true,
        content,
        filename,
    }))
}

// ── Introspection ─────────────────────────────────────────────────────────

/// `GET /api/tools`
pub async fn tools_handler(State(state): State<SharedState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        version: LISTING_VERSION,
        tools: state.tools.definitions(),
        listing: state.tools.describe(),
    })
}

/// `GET /api/health`
pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.clone(),
        tools: state.tools.len(),
    })
}
