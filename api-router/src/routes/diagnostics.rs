use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use common::artifacts::ArtifactSet;
use serde::{Deserialize, Serialize};

use crate::api_state::ApiState;

use super::NO_STORE;

#[derive(Debug, Deserialize)]
pub struct DiagnosticsParams {
    pub doc: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostics {
    storage: &'static str,
    completion_configured: bool,
    documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<ArtifactSet>,
}

pub async fn diagnostics(
    State(state): State<ApiState>,
    Query(params): Query<DiagnosticsParams>,
) -> impl IntoResponse {
    let doc = params.doc.filter(|d| !d.trim().is_empty());
    let artifacts = match doc.as_deref() {
        Some(doc) => Some(state.locator.locate(doc).await),
        None => None,
    };

    let report = Diagnostics {
        storage: state.storage.backend_kind().as_str(),
        completion_configured: state.orchestrator.is_configured(),
        documents: state.locator.list_known_bases().await,
        doc,
        artifacts,
    };

    (NO_STORE, Json(report))
}
