use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

use super::NO_STORE;

pub async fn list_documents(State(state): State<ApiState>) -> impl IntoResponse {
    let documents = state.locator.list_known_bases().await;

    (NO_STORE, Json(json!({ "documents": documents })))
}
