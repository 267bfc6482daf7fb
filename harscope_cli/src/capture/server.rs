//! Capture HTTP server

use crate::tui::TuiEvent;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use harscope_core::HarEntry;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// App state for the capture server
#[derive(Clone)]
struct AppState {
    events: mpsc::Sender<TuiEvent>,
}

/// Build the capture router. Accepted entries are forwarded to `events`.
pub fn router(events: mpsc::Sender<TuiEvent>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/entries", post(submit_entries))
        .route("/api/clear", post(clear_entries))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { events })
}

/// Start the capture server on the given loopback port (0 picks a free one)
pub async fn start_server(
    port: u16,
    events: mpsc::Sender<TuiEvent>,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind capture listener to {}", addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read capture listener address")?;

    let app = router(events);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::warn!("Capture listener stopped: {}", e);
        }
    });

    tracing::info!("Capture listener on http://{}", local_addr);
    Ok((local_addr, handle))
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    service: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "harscope-capture".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Entries
// ============================================================================

/// A single entry or a batch of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryBatch {
    Many(Vec<HarEntry>),
    One(Box<HarEntry>),
}

impl EntryBatch {
    fn into_vec(self) -> Vec<HarEntry> {
        match self {
            EntryBatch::Many(entries) => entries,
            EntryBatch::One(entry) => vec![*entry],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitResponse {
    accepted: usize,
}

async fn submit_entries(State(state): State<AppState>, Json(batch): Json<EntryBatch>) -> Response {
    let entries = batch.into_vec();
    let accepted = entries.len();
    if accepted == 0 {
        return (StatusCode::ACCEPTED, Json(SubmitResponse { accepted })).into_response();
    }

    tracing::debug!("Received {} captured entries", accepted);
    match state.events.send(TuiEvent::Captured(entries)).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(SubmitResponse { accepted })).into_response(),
        Err(_) => {
            tracing::warn!("Viewer is gone, rejecting {} entries", accepted);
            (StatusCode::SERVICE_UNAVAILABLE, "Viewer is not running").into_response()
        }
    }
}

async fn clear_entries(State(state): State<AppState>) -> StatusCode {
    match state.events.send(TuiEvent::CaptureCleared).await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
