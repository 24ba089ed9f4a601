use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use common::{
    storage::types::uploaded_document::UploadedDocument,
    utils::upload_limits::validate_upload_input,
};
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

pub const DOCUMENT_NAME_HEADER: &str = "x-document-name";

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: Option<String>,
}

/// Body form used when the name is not given out of band.
#[derive(Debug, Default, Deserialize)]
struct JsonUpload {
    name: Option<String>,
    content: Option<String>,
}

pub async fn upload_document(
    State(state): State<ApiState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let header_name = headers
        .get(DOCUMENT_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let explicit_name = params
        .name
        .or(header_name)
        .filter(|name| !name.trim().is_empty());

    let text = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::ValidationError("Document body must be UTF-8 text".to_string()))?;

    let (name, content) = match explicit_name {
        Some(name) => (Some(name), Some(text)),
        None => {
            let parsed: JsonUpload = serde_json::from_str(&text).unwrap_or_default();
            (parsed.name, parsed.content)
        }
    };

    info!(
        has_name = name.is_some(),
        content_bytes = content.as_ref().map_or(0, String::len),
        "Received upload request"
    );

    let upload = validate_upload_input(&state.config, name, content)?;
    let document = UploadedDocument::store(&state.storage, &upload.name, upload.content).await?;

    Ok((StatusCode::CREATED, Json(document)))
}
