use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Telephony sessions currently bridged
    pub active_sessions: usize,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        active_sessions: state.active_sessions(),
    })
}
