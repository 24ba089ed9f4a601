use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::storage::{
    store::{StorageAccessError, StorageManager},
    types::{quiz_manifest::QuizManifest, video_manifest::VideoManifest},
};

use super::{
    naming, ArtifactSet, ALL_CONTAINERS, ARTIFACT_CONTAINERS, QUIZ_CONTAINER, VIDEO_CONTAINER,
};

/// Manifests resolved for a document, alongside the artifact names they came from.
#[derive(Debug, Clone, Default)]
pub struct LocatedManifests {
    pub artifacts: ArtifactSet,
    pub video: Option<VideoManifest>,
    pub quiz: Option<QuizManifest>,
}

/// Correlates stored objects with logical documents.
///
/// Nothing is cached: every call takes a fresh listing snapshot, since the
/// external pipeline writes artifacts without notifying this service.
#[derive(Clone)]
pub struct ArtifactLocator {
    storage: StorageManager,
}

impl ArtifactLocator {
    pub fn new(storage: StorageManager) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// List a container, degrading any storage failure to an empty listing.
    async fn list_or_empty(&self, container: &str) -> Vec<String> {
        match self.storage.list(container).await {
            Ok(names) => names,
            Err(StorageAccessError::ContainerNotFound(_)) => {
                debug!(container, "Container not created yet, treating as empty");
                Vec::new()
            }
            Err(e) => {
                warn!(container, error = %e, "Listing failed, treating container as empty");
                Vec::new()
            }
        }
    }

    /// Listings for `containers`, fetched concurrently and returned in the given order.
    async fn snapshot<'a>(&self, containers: &[&'a str]) -> Vec<(&'a str, Vec<String>)> {
        let listings = join_all(containers.iter().map(|c| self.list_or_empty(c))).await;
        containers.iter().copied().zip(listings).collect()
    }

    /// Find the derived artifacts whose decoded base matches `base`.
    ///
    /// Within a container the first matching object in listing order wins.
    #[instrument(skip(self))]
    pub async fn locate(&self, base: &str) -> ArtifactSet {
        let containers: Vec<&str> = ARTIFACT_CONTAINERS.iter().map(|(c, _)| *c).collect();
        let snapshot = self.snapshot(&containers).await;

        let mut artifacts = ArtifactSet::default();
        for ((container, names), (_, kinds)) in snapshot.iter().zip(ARTIFACT_CONTAINERS.iter()) {
            for name in names {
                let decoded = naming::decode(name);
                if kinds.contains(&decoded.kind) && decoded.matches(base) {
                    artifacts.claim(decoded.kind, name);
                }
            }
            debug!(container, objects = names.len(), "Scanned container");
        }

        artifacts
    }

    /// Every decoded base across all containers, sorted ascending.
    ///
    /// Deduplication is by exact string, so bases differing only in case are
    /// all reported even though [`Self::locate`] treats them as one document.
    pub async fn list_known_bases(&self) -> Vec<String> {
        self.snapshot(&ALL_CONTAINERS)
            .await
            .into_iter()
            .flat_map(|(_, names)| names)
            .map(|name| naming::decode(&name).base)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Read and parse a video manifest, `None` when unreadable or malformed.
    pub async fn load_video_manifest(&self, name: &str) -> Option<VideoManifest> {
        let bytes = self.read_or_none(VIDEO_CONTAINER, name).await?;
        VideoManifest::from_slice(&bytes)
            .map_err(|e| warn!(container = VIDEO_CONTAINER, name, error = %e, "Malformed video manifest"))
            .ok()
    }

    /// Read and parse a quiz manifest, `None` when unreadable or malformed.
    pub async fn load_quiz_manifest(&self, name: &str) -> Option<QuizManifest> {
        let bytes = self.read_or_none(QUIZ_CONTAINER, name).await?;
        QuizManifest::from_slice(&bytes)
            .map_err(|e| warn!(container = QUIZ_CONTAINER, name, error = %e, "Malformed quiz manifest"))
            .ok()
    }

    /// Locate `base` and load whichever manifests exist.
    #[instrument(skip(self))]
    pub async fn load_manifests(&self, base: &str) -> LocatedManifests {
        let artifacts = self.locate(base).await;

        let video = async {
            match artifacts.video.as_deref() {
                Some(name) => self.load_video_manifest(name).await,
                None => None,
            }
        };
        let quiz = async {
            match artifacts.quiz.as_deref() {
                Some(name) => self.load_quiz_manifest(name).await,
                None => None,
            }
        };
        let (video, quiz) = futures::join!(video, quiz);

        LocatedManifests {
            artifacts,
            video,
            quiz,
        }
    }

    async fn read_or_none(&self, container: &str, name: &str) -> Option<bytes::Bytes> {
        self.storage
            .read(container, name)
            .await
            .map_err(|e| warn!(container, name, error = %e, "Failed to read artifact"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{UPLOAD_CONTAINER, VIDEO_FILE_CONTAINER};
    use bytes::Bytes;
    use serde_json::json;

    async fn put(storage: &StorageManager, container: &str, name: &str, body: &[u8]) {
        storage
            .write(container, name, Bytes::copy_from_slice(body), true)
            .await
            .expect("write object");
    }

    #[tokio::test]
    async fn locate_correlates_across_containers() {
        let storage = StorageManager::in_memory();
        put(&storage, VIDEO_CONTAINER, "20250101120000_Project Alpha.txt.video.json", b"{}").await;
        put(&storage, QUIZ_CONTAINER, "Project Alpha.quiz.json", b"{}").await;
        put(&storage, VIDEO_FILE_CONTAINER, "Project Alpha.mp4", b"").await;
        put(&storage, VIDEO_FILE_CONTAINER, "project alpha.png", b"").await;
        put(&storage, QUIZ_CONTAINER, "Project Beta.quiz.json", b"{}").await;

        let locator = ArtifactLocator::new(storage);
        let artifacts = locator.locate("Project Alpha").await;

        assert_eq!(
            artifacts,
            ArtifactSet {
                video: Some("20250101120000_Project Alpha.txt.video.json".into()),
                video_file: Some("Project Alpha.mp4".into()),
                thumbnail: Some("project alpha.png".into()),
                quiz: Some("Project Alpha.quiz.json".into()),
            }
        );
    }

    #[tokio::test]
    async fn locate_ignores_objects_of_the_wrong_kind() {
        let storage = StorageManager::in_memory();
        // A quiz manifest dropped into the video container is not a video manifest.
        put(&storage, VIDEO_CONTAINER, "Doc.quiz.json", b"{}").await;
        put(&storage, UPLOAD_CONTAINER, "20250101120000_Doc.txt", b"text").await;

        let artifacts = ArtifactLocator::new(storage).locate("Doc").await;
        assert_eq!(artifacts, ArtifactSet::default());
    }

    #[tokio::test]
    async fn first_match_in_listing_order_wins() {
        let storage = StorageManager::in_memory();
        put(&storage, VIDEO_FILE_CONTAINER, "Doc.mp4", b"").await;
        put(&storage, VIDEO_FILE_CONTAINER, "doc.webm", b"").await;

        let locator = ArtifactLocator::new(storage.clone());
        let listing = storage.list(VIDEO_FILE_CONTAINER).await.expect("list");
        let first = listing
            .iter()
            .find(|name| naming::decode(name).matches("doc"))
            .cloned();

        assert_eq!(locator.locate("doc").await.video_file, first);
    }

    #[tokio::test]
    async fn missing_containers_degrade_to_empty() {
        let locator = ArtifactLocator::new(StorageManager::in_memory());

        assert_eq!(locator.locate("Doc").await, ArtifactSet::default());
        assert!(locator.list_known_bases().await.is_empty());
    }

    #[tokio::test]
    async fn locate_is_idempotent_without_writes() {
        let storage = StorageManager::in_memory();
        put(&storage, VIDEO_CONTAINER, "Doc.video.json", b"{}").await;
        let locator = ArtifactLocator::new(storage);

        let first = locator.locate("Doc").await;
        let second = locator.locate("Doc").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn locate_sees_artifacts_written_between_calls() {
        let storage = StorageManager::in_memory();
        let locator = ArtifactLocator::new(storage.clone());
        assert!(locator.locate("Doc").await.quiz.is_none());

        put(&storage, QUIZ_CONTAINER, "Doc.quiz.json", b"{}").await;
        assert_eq!(
            locator.locate("Doc").await.quiz.as_deref(),
            Some("Doc.quiz.json")
        );
    }

    #[tokio::test]
    async fn known_bases_are_sorted_and_deduplicated_case_sensitively() {
        let storage = StorageManager::in_memory();
        put(&storage, UPLOAD_CONTAINER, "20250101120000_Project Alpha.txt", b"a").await;
        put(&storage, UPLOAD_CONTAINER, "20250102120000_Project Alpha.txt", b"a").await;
        put(&storage, VIDEO_CONTAINER, "Project Alpha.txt.video.json", b"{}").await;
        put(&storage, QUIZ_CONTAINER, "doc.quiz.json", b"{}").await;
        put(&storage, UPLOAD_CONTAINER, "20250101120000_Doc.md", b"d").await;

        let bases = ArtifactLocator::new(storage).list_known_bases().await;
        assert_eq!(bases, vec!["Doc", "Project Alpha", "doc"]);
    }

    #[tokio::test]
    async fn names_with_reserved_characters_correlate() {
        let storage = StorageManager::in_memory();
        put(&storage, UPLOAD_CONTAINER, "20250101120000_Meeting #3.txt", b"notes").await;
        put(&storage, UPLOAD_CONTAINER, "20250101120000_Q3 [draft].txt", b"notes").await;
        put(&storage, VIDEO_CONTAINER, "Meeting #3.video.json", b"{}").await;

        let locator = ArtifactLocator::new(storage);
        assert_eq!(
            locator.list_known_bases().await,
            vec!["Meeting #3", "Q3 [draft]"]
        );
        assert_eq!(
            locator.locate("Meeting #3").await.video.as_deref(),
            Some("Meeting #3.video.json")
        );
        assert!(locator
            .load_video_manifest("Meeting #3.video.json")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn load_manifests_parses_located_objects() {
        let storage = StorageManager::in_memory();
        let video = json!({ "summary": "Overview", "scenes": [{ "title": "Intro", "text": "Hello" }] });
        put(&storage, VIDEO_CONTAINER, "Doc.video.json", video.to_string().as_bytes()).await;
        put(&storage, QUIZ_CONTAINER, "Doc.quiz.json", b"not json").await;

        let located = ArtifactLocator::new(storage).load_manifests("doc").await;

        assert_eq!(
            located.video.as_ref().and_then(VideoManifest::summary_text),
            Some("Overview")
        );
        assert_eq!(located.artifacts.quiz.as_deref(), Some("Doc.quiz.json"));
        assert!(located.quiz.is_none(), "malformed quiz degrades to absent");
    }
}
