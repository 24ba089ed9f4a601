use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::{
    artifacts::naming::{self, ArtifactKind},
    storage::types::quiz_manifest::QuizManifest,
};

use crate::{api_state::ApiState, error::ApiError};

use super::NO_STORE;

pub async fn get_quiz(
    State(state): State<ApiState>,
    Path(doc): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(name) = state.locator.locate(&doc).await.quiz else {
        return Err(ApiError::MissingArtifact {
            message: "Quiz not found".to_string(),
            blob: naming::encode(&doc, ArtifactKind::QuizManifest),
        });
    };

    // Located but unreadable or malformed counts as missing.
    let quiz = state
        .locator
        .load_quiz_manifest(&name)
        .await
        .ok_or_else(|| ApiError::MissingArtifact {
            message: "Quiz not found".to_string(),
            blob: name,
        })?;

    Ok((NO_STORE, Json(quiz)))
}

pub async fn sample_quiz() -> impl IntoResponse {
    (NO_STORE, Json(QuizManifest::sample()))
}
