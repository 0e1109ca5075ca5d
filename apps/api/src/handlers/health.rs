use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
        storage: state.storage_backend.as_str(),
    })
}
