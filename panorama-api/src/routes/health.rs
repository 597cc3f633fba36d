//! Health check endpoint.

use axum::{extract::State, response::IntoResponse, Json};

use crate::state::AppState;
use crate::types::HealthResponse;

/// GET /health - Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
