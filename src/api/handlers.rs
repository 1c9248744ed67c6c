//! HTTP endpoint handlers
//!
//! Thin glue only: each handler parses the identity and body, calls one
//! state operation, and serializes the result. All countdown state the
//! client sees is the derived `remaining` field.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::{
    error::TimerError,
    state::{AppState, TimerKey, TimerSummary},
};
use super::responses::{AckResponse, HealthResponse, PauseResponse, StatusResponse};

/// Request body for POST /api/timers.
#[derive(Debug, Deserialize)]
pub struct CreateTimerRequest {
    pub server: u32,
    pub event: String,
    /// Countdown length in minutes; converted to milliseconds internally.
    pub duration: f64,
}

/// Handle POST /api/timers - create or overwrite a timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTimerRequest>,
) -> Result<Json<TimerSummary>, TimerError> {
    let key = TimerKey::new(req.server, req.event);
    let summary = state.create_timer(key, req.duration)?;
    Ok(Json(summary))
}

/// Handle GET /api/timers - list all timers with derived remaining time
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TimerSummary>>, TimerError> {
    Ok(Json(state.list_timers()?))
}

/// Handle GET /api/timers/:server/:event - get one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path((server, event)): Path<(u32, String)>,
) -> Result<Json<TimerSummary>, TimerError> {
    Ok(Json(state.get_timer(&TimerKey::new(server, event))?))
}

/// Handle PUT /api/timers/:server/:event/pause - freeze a running timer
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path((server, event)): Path<(u32, String)>,
) -> Result<Json<PauseResponse>, TimerError> {
    let remaining = state.pause_timer(&TimerKey::new(server, event))?;
    Ok(Json(PauseResponse { remaining }))
}

/// Handle PUT /api/timers/:server/:event/start - resume a paused timer
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path((server, event)): Path<(u32, String)>,
) -> Result<Json<AckResponse>, TimerError> {
    state.resume_timer(&TimerKey::new(server, event))?;
    Ok(Json(AckResponse::ok("Timer resumed")))
}

/// Handle PUT /api/timers/:server/:event/reset - restart current budget
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path((server, event)): Path<(u32, String)>,
) -> Result<Json<AckResponse>, TimerError> {
    state.reset_timer(&TimerKey::new(server, event))?;
    Ok(Json(AckResponse::ok("Timer reset")))
}

/// Handle DELETE /api/timers/:server/:event - idempotent delete
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path((server, event)): Path<(u32, String)>,
) -> Result<StatusCode, TimerError> {
    state.delete_timer(&TimerKey::new(server, event))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /status - Return current server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, TimerError> {
    let (last_action, last_action_time) = state.get_last_action();
    Ok(Json(StatusResponse {
        timers: state.timer_count()?,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
