use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::artifacts::UPLOAD_CONTAINER;
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: 200 when the object store answers, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    match state.storage.container_exists(UPLOAD_CONTAINER).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "storage": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "storage": "fail" },
                "reason": e.to_string()
            })),
        ),
    }
}
