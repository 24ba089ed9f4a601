use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::api_state::ApiState;

use super::NO_STORE;

pub async fn get_status(
    State(state): State<ApiState>,
    Path(doc): Path<String>,
) -> impl IntoResponse {
    let status = state.locator.document_status(&doc).await;

    (NO_STORE, Json(status))
}
