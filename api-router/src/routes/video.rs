use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::storage::types::video_manifest::VideoManifest;
use tracing::debug;

use crate::api_state::ApiState;

use super::NO_STORE;

/// The stored video manifest, or a generated stub until the pipeline writes one.
pub async fn get_video(
    State(state): State<ApiState>,
    Path(doc): Path<String>,
) -> impl IntoResponse {
    let located = match state.locator.locate(&doc).await.video {
        Some(name) => state.locator.load_video_manifest(&name).await,
        None => None,
    };

    let manifest = located.unwrap_or_else(|| {
        debug!(%doc, "No video manifest yet, serving stub");
        VideoManifest::stub(&doc)
    });

    (NO_STORE, Json(manifest))
}
