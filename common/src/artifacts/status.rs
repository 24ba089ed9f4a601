use serde::Serialize;

use super::{ArtifactLocator, ArtifactSet};

/// Readiness of a document's derived manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessStatus {
    pub video: bool,
    pub quiz: bool,
    pub ready: bool,
}

impl ReadinessStatus {
    pub fn from_artifacts(artifacts: &ArtifactSet) -> Self {
        let video = artifacts.video.is_some();
        let quiz = artifacts.quiz.is_some();
        Self {
            video,
            quiz,
            ready: video && quiz,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStatus {
    pub doc: String,
    #[serde(flatten)]
    pub status: ReadinessStatus,
    pub artifacts: ArtifactSet,
}

impl ArtifactLocator {
    /// Readiness of `base`, recomputed from a fresh lookup on every call.
    pub async fn reconcile(&self, base: &str) -> ReadinessStatus {
        ReadinessStatus::from_artifacts(&self.locate(base).await)
    }

    pub async fn document_status(&self, base: &str) -> DocumentStatus {
        let artifacts = self.locate(base).await;
        DocumentStatus {
            doc: base.to_string(),
            status: ReadinessStatus::from_artifacts(&artifacts),
            artifacts,
        }
    }
}
