use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use retrieval_pipeline::ChatQuery;

use crate::{api_state::ApiState, error::ApiError};

/// Answer a question about one document. Fields are read one by one so a
/// malformed optional field never hides the required ones.
pub async fn chat(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let query = ChatQuery::from_slice(&body);
    let answer = state.orchestrator.answer(&query).await?;

    Ok(Json(answer))
}
