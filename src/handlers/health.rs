use crate::network::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub groups: usize,
    pub users: usize,
    pub sessions: usize,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let directory = &state.directory;
    Json(HealthReport {
        status: "ok",
        groups: directory.group_count(),
        users: directory.user_count(),
        sessions: directory.session_count().await,
    })
}
