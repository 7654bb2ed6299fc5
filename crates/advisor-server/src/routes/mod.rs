//! API route handlers

use advisor_core::{
    AdvisorError, Lead, LeadStore, RecordingObserver, SwarmEffect, SwarmObserver, SwarmOutcome,
    SwarmStep,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::state::AppState;

// ========== Lead Routes ==========

/// List stored lead IDs
pub async fn list_leads(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "leads": state.store.ids() }))
}

/// Get lead by ID
pub async fn get_lead(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.store.get(&id) {
        Ok(lead) => (StatusCode::OK, Json(serde_json::json!({ "lead": lead }))),
        Err(e) => error_response(e),
    }
}

/// Create or replace a lead
pub async fn put_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(lead): Json<Lead>,
) -> impl IntoResponse {
    if lead.id != id {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": format!("Lead ID '{}' does not match path '{}'", lead.id, id)
            })),
        );
    }

    match state.store.upsert(lead) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))),
        Err(e) => error_response(e),
    }
}

// ========== Swarm Routes ==========

/// Run the swarm for a lead and return the outcome with every step
pub async fn run_swarm(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let recorder = Arc::new(RecordingObserver::new());

    match state
        .engine
        .run_exclusive(&state.locks, state.lead_store(), &id, recorder.clone())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "outcome": outcome,
                "steps": recorder.steps()
            })),
        ),
        Err(e) => error_response(e),
    }
}

fn error_response(e: AdvisorError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        AdvisorError::LeadNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    )
}

// ========== WebSocket ==========

/// Frame pushed to WebSocket clients
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Step { step: SwarmStep },
    Effect { effect: SwarmEffect },
    Outcome { outcome: SwarmOutcome },
    Error { message: String },
}

/// Forwards swarm progress into the socket task
struct FrameObserver {
    tx: mpsc::UnboundedSender<ServerFrame>,
}

impl SwarmObserver for FrameObserver {
    fn on_step(&self, step: &SwarmStep) {
        let _ = self.tx.send(ServerFrame::Step { step: step.clone() });
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        let _ = self.tx.send(ServerFrame::Effect {
            effect: effect.clone(),
        });
    }
}

/// Stream a swarm run over a WebSocket
pub async fn websocket_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, id))
}

async fn handle_websocket(socket: WebSocket, state: AppState, lead_id: String) {
    let (mut sender, _receiver) = socket.split();

    tracing::info!(lead_id = %lead_id, "WebSocket connected");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let run = {
        let state = state.clone();
        let lead_id = lead_id.clone();
        tokio::spawn(async move {
            state
                .engine
                .run_exclusive(
                    &state.locks,
                    state.lead_store(),
                    &lead_id,
                    FrameObserver { tx },
                )
                .await
        })
    };

    // The channel closes when the run drops its observer.
    while let Some(frame) = rx.recv().await {
        if send_frame(&mut sender, &frame).await.is_err() {
            tracing::info!(lead_id = %lead_id, "WebSocket client went away; run continues");
            break;
        }
    }

    let last = match run.await {
        Ok(Ok(outcome)) => ServerFrame::Outcome { outcome },
        Ok(Err(e)) => ServerFrame::Error {
            message: e.to_string(),
        },
        Err(e) => ServerFrame::Error {
            message: format!("Swarm task failed: {}", e),
        },
    };
    let _ = send_frame(&mut sender, &last).await;
    let _ = sender.send(Message::Close(None)).await;
    tracing::info!(lead_id = %lead_id, "WebSocket closed");
}

async fn send_frame<S>(sender: &mut S, frame: &ServerFrame) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize frame");
            return Ok(());
        }
    };
    sender.send(Message::Text(text)).await
}
