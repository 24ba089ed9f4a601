pub mod locator;
pub mod naming;
pub mod status;

use serde::Serialize;

pub use locator::{ArtifactLocator, LocatedManifests};
pub use naming::{ArtifactKind, DecodedName};
pub use status::{DocumentStatus, ReadinessStatus};

pub const UPLOAD_CONTAINER: &str = "uploaded-docs";
pub const VIDEO_CONTAINER: &str = "generated-videos";
pub const VIDEO_FILE_CONTAINER: &str = "generated-video-files";
pub const QUIZ_CONTAINER: &str = "quiz-data";

/// Every container the service reads, upload container first.
pub const ALL_CONTAINERS: [&str; 4] = [
    UPLOAD_CONTAINER,
    VIDEO_CONTAINER,
    VIDEO_FILE_CONTAINER,
    QUIZ_CONTAINER,
];

/// Containers written by the external pipeline, with the artifact kinds each holds.
pub(crate) const ARTIFACT_CONTAINERS: [(&str, &[ArtifactKind]); 3] = [
    (VIDEO_CONTAINER, &[ArtifactKind::VideoManifest]),
    (
        VIDEO_FILE_CONTAINER,
        &[ArtifactKind::VideoFile, ArtifactKind::Thumbnail],
    ),
    (QUIZ_CONTAINER, &[ArtifactKind::QuizManifest]),
];

/// Derived artifacts found for one logical document at lookup time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<String>,
}

impl ArtifactSet {
    fn slot_mut(&mut self, kind: ArtifactKind) -> Option<&mut Option<String>> {
        match kind {
            ArtifactKind::VideoManifest => Some(&mut self.video),
            ArtifactKind::VideoFile => Some(&mut self.video_file),
            ArtifactKind::Thumbnail => Some(&mut self.thumbnail),
            ArtifactKind::QuizManifest => Some(&mut self.quiz),
            ArtifactKind::SourceDocument => None,
        }
    }

    /// Record `name` for `kind` unless an earlier object already claimed it.
    pub(crate) fn claim(&mut self, kind: ArtifactKind, name: &str) {
        if let Some(slot) = self.slot_mut(kind) {
            if slot.is_none() {
                *slot = Some(name.to_string());
            }
        }
    }
}
