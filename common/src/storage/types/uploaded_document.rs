use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    artifacts::{naming, UPLOAD_CONTAINER},
    error::AppError,
    storage::store::StorageManager,
};

/// Result of persisting a user upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    /// Logical base the upload will be correlated under.
    pub doc_name: String,
    /// Object name in the upload container.
    pub file_name: String,
    pub uploaded_bytes: usize,
    pub timestamp: DateTime<Utc>,
}

impl UploadedDocument {
    /// Persist `content` under a timestamped, sanitized name in the upload container.
    pub async fn store(
        storage: &StorageManager,
        original_name: &str,
        content: String,
    ) -> Result<Self, AppError> {
        Self::store_at(storage, original_name, content, Utc::now()).await
    }

    pub async fn store_at(
        storage: &StorageManager,
        original_name: &str,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let safe_name = sanitize_file_name(original_name);
        let file_name = format!("{}_{safe_name}", now.format("%Y%m%d%H%M%S"));
        let uploaded_bytes = content.len();

        storage.ensure_container(UPLOAD_CONTAINER).await?;
        storage
            .write(UPLOAD_CONTAINER, &file_name, Bytes::from(content), true)
            .await?;

        let doc_name = naming::decode(&file_name).base;
        info!(%doc_name, %file_name, uploaded_bytes, "Stored uploaded document");

        Ok(Self {
            doc_name,
            file_name,
            uploaded_bytes,
            timestamp: now,
        })
    }
}

/// Make a caller-supplied file name safe to use as an object name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = name
        .trim()
        .replace("..", "_")
        .replace(['/', '\\'], "_");

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
