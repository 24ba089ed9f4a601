use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{path::Path as ObjPath, ObjectStore, PutMode, PutOptions, PutPayload};
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::utils::config::{AppConfig, StorageKind};

pub type DynStore = Arc<dyn ObjectStore>;

/// Marker object written by [`StorageManager::create_container`].
const CONTAINER_MARKER: &str = ".container";

#[derive(Error, Debug)]
pub enum StorageAccessError {
    #[error("container `{0}` does not exist")]
    ContainerNotFound(String),
    #[error("object `{container}/{name}` not found")]
    NotFound { container: String, name: String },
    #[error("object `{container}/{name}` already exists")]
    AlreadyExists { container: String, name: String },
    #[error("storage backend error: {0}")]
    Backend(#[from] object_store::Error),
}

impl StorageAccessError {
    fn from_backend(err: object_store::Error, container: &str, name: &str) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Self::NotFound {
                container: container.to_string(),
                name: name.to_string(),
            },
            object_store::Error::AlreadyExists { .. } => Self::AlreadyExists {
                container: container.to_string(),
                name: name.to_string(),
            },
            other => Self::Backend(other),
        }
    }
}

/// Object storage organised as named containers holding flat object names.
///
/// A container maps to a top-level prefix of the underlying store, so
/// `generated-videos/Doc.video.json` is the object `Doc.video.json` in the
/// `generated-videos` container. The handle is cheap to clone and is shared by
/// every component that needs storage.
#[derive(Clone)]
pub struct StorageManager {
    store: DynStore,
    backend_kind: StorageKind,
    local_base: Option<PathBuf>,
}

impl StorageManager {
    /// Create a new StorageManager with the specified configuration.
    pub async fn new(cfg: &AppConfig) -> object_store::Result<Self> {
        let backend_kind = cfg.storage.clone();
        let (store, local_base) = create_storage_backend(cfg).await?;

        Ok(Self {
            store,
            backend_kind,
            local_base,
        })
    }

    /// Create a StorageManager with a custom storage backend.
    pub fn with_backend(store: DynStore, backend_kind: StorageKind) -> Self {
        Self {
            store,
            backend_kind,
            local_base: None,
        }
    }

    /// Fresh in-memory storage, isolated per call.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(InMemory::new()), StorageKind::Memory)
    }

    pub fn backend_kind(&self) -> &StorageKind {
        &self.backend_kind
    }

    /// Access the resolved local base directory when using the local backend.
    pub fn local_base_path(&self) -> Option<&Path> {
        self.local_base.as_deref()
    }

    /// List the object names directly inside `container`, in backend order.
    ///
    /// A container that was never created (no marker, no objects) yields
    /// [`StorageAccessError::ContainerNotFound`].
    pub async fn list(&self, container: &str) -> Result<Vec<String>, StorageAccessError> {
        let prefix = ObjPath::from(container);
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;

        let mut has_marker = false;
        let names: Vec<String> = listing
            .objects
            .into_iter()
            .filter_map(|meta| meta.location.filename().map(decode_object_name))
            .filter(|name| {
                if name == CONTAINER_MARKER {
                    has_marker = true;
                    false
                } else {
                    true
                }
            })
            .collect();

        if names.is_empty() && !has_marker {
            return Err(StorageAccessError::ContainerNotFound(container.to_string()));
        }

        Ok(names)
    }

    /// Read the full contents of an object.
    pub async fn read(&self, container: &str, name: &str) -> Result<Bytes, StorageAccessError> {
        let path = object_path(container, name);
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| StorageAccessError::from_backend(e, container, name))?;
        result
            .bytes()
            .await
            .map_err(|e| StorageAccessError::from_backend(e, container, name))
    }

    /// Write an object. With `overwrite == false` an existing object is left
    /// untouched and [`StorageAccessError::AlreadyExists`] is returned.
    pub async fn write(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        overwrite: bool,
    ) -> Result<(), StorageAccessError> {
        let path = object_path(container, name);
        let payload = PutPayload::from_bytes(data);
        let mode = if overwrite {
            PutMode::Overwrite
        } else {
            PutMode::Create
        };

        self.store
            .put_opts(&path, payload, PutOptions::from(mode))
            .await
            .map(|_| ())
            .map_err(|e| StorageAccessError::from_backend(e, container, name))
    }

    /// Check whether a container exists, either created explicitly or implied
    /// by objects stored under it.
    pub async fn container_exists(&self, container: &str) -> Result<bool, StorageAccessError> {
        match self.list(container).await {
            Ok(_) => Ok(true),
            Err(StorageAccessError::ContainerNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a container. Fails with `AlreadyExists` when it is already there.
    pub async fn create_container(&self, container: &str) -> Result<(), StorageAccessError> {
        if self.container_exists(container).await? {
            return Err(StorageAccessError::AlreadyExists {
                container: container.to_string(),
                name: CONTAINER_MARKER.to_string(),
            });
        }

        self.write(container, CONTAINER_MARKER, Bytes::new(), false)
            .await
    }

    /// Create the container unless it already exists.
    pub async fn ensure_container(&self, container: &str) -> Result<(), StorageAccessError> {
        match self.create_container(container).await {
            Ok(()) | Err(StorageAccessError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn object_path(container: &str, name: &str) -> ObjPath {
    ObjPath::from(container).child(name)
}

/// Undo the percent-encoding `ObjPath::child` applies to reserved characters,
/// so listed names can be passed straight back to [`StorageManager::read`].
fn decode_object_name(encoded: &str) -> String {
    match percent_decode_str(encoded).decode_utf8() {
        Ok(name) => name.into_owned(),
        Err(e) => {
            tracing::warn!(name = encoded, error = %e, "Object name is not UTF-8 once decoded");
            encoded.to_string()
        }
    }
}

/// Create a storage backend based on configuration.
async fn create_storage_backend(
    cfg: &AppConfig,
) -> object_store::Result<(DynStore, Option<PathBuf>)> {
    match cfg.storage {
        StorageKind::Local => {
            let base = resolve_base_dir(cfg);
            if !base.exists() {
                tokio::fs::create_dir_all(&base).await.map_err(|e| {
                    object_store::Error::Generic {
                        store: "LocalFileSystem",
                        source: e.into(),
                    }
                })?;
            }
            let store = LocalFileSystem::new_with_prefix(base.clone())?;
            Ok((Arc::new(store), Some(base)))
        }
        StorageKind::Memory => {
            let store = InMemory::new();
            Ok((Arc::new(store), None))
        }
    }
}

/// Resolve the absolute base directory used for local storage from config.
///
/// If `data_dir` is relative, it is resolved against the current working directory.
pub fn resolve_base_dir(cfg: &AppConfig) -> PathBuf {
    if cfg.data_dir.starts_with('/') {
        PathBuf::from(&cfg.data_dir)
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&cfg.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config_local(root: &Path) -> AppConfig {
        AppConfig {
            data_dir: root.to_string_lossy().into_owned(),
            storage: StorageKind::Local,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_write_read_and_overwrite() {
        let storage = StorageManager::in_memory();

        storage
            .write("docs", "a.txt", Bytes::from_static(b"first"), true)
            .await
            .expect("write first");
        storage
            .write("docs", "a.txt", Bytes::from_static(b"second"), true)
            .await
            .expect("overwrite");

        let data = storage.read("docs", "a.txt").await.expect("read");
        assert_eq!(data.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_write_without_overwrite_keeps_existing_object() {
        let storage = StorageManager::in_memory();
        storage
            .write("docs", "a.txt", Bytes::from_static(b"first"), false)
            .await
            .expect("create");

        let result = storage
            .write("docs", "a.txt", Bytes::from_static(b"second"), false)
            .await;
        assert!(matches!(
            result,
            Err(StorageAccessError::AlreadyExists { ref name, .. }) if name == "a.txt"
        ));

        let data = storage.read("docs", "a.txt").await.expect("read");
        assert_eq!(data.as_ref(), b"first");
    }

    #[tokio::test]
    async fn test_read_missing_object_maps_to_not_found() {
        let storage = StorageManager::in_memory();
        let result = storage.read("docs", "missing.txt").await;

        assert!(matches!(
            result,
            Err(StorageAccessError::NotFound { ref container, ref name })
                if container == "docs" && name == "missing.txt"
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_container_and_hides_marker() {
        let storage = StorageManager::in_memory();
        storage.create_container("quiz-data").await.expect("create");
        storage
            .write("quiz-data", "Doc.quiz.json", Bytes::from_static(b"{}"), true)
            .await
            .expect("write quiz");
        storage
            .write("generated-videos", "Doc.video.json", Bytes::from_static(b"{}"), true)
            .await
            .expect("write video");

        let names = storage.list("quiz-data").await.expect("list");
        assert_eq!(names, vec!["Doc.quiz.json".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_container_is_reported() {
        let storage = StorageManager::in_memory();

        assert!(matches!(
            storage.list("uploaded-docs").await,
            Err(StorageAccessError::ContainerNotFound(ref c)) if c == "uploaded-docs"
        ));
        assert!(!storage
            .container_exists("uploaded-docs")
            .await
            .expect("exists check"));
    }

    #[tokio::test]
    async fn test_create_container_twice() {
        let storage = StorageManager::in_memory();
        storage
            .create_container("uploaded-docs")
            .await
            .expect("first create");

        assert!(storage
            .container_exists("uploaded-docs")
            .await
            .expect("exists"));
        assert!(storage
            .list("uploaded-docs")
            .await
            .expect("list empty container")
            .is_empty());
        assert!(matches!(
            storage.create_container("uploaded-docs").await,
            Err(StorageAccessError::AlreadyExists { .. })
        ));
        storage
            .ensure_container("uploaded-docs")
            .await
            .expect("ensure is idempotent");
    }

    #[tokio::test]
    async fn test_local_backend_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = test_config_local(dir.path());
        let storage = StorageManager::new(&cfg)
            .await
            .expect("create storage manager");
        assert_eq!(storage.local_base_path(), Some(dir.path()));

        storage
            .write(
                "uploaded-docs",
                "20250101120000_Project Alpha.txt",
                Bytes::from_static(b"hello"),
                true,
            )
            .await
            .expect("write");

        let names = storage.list("uploaded-docs").await.expect("list");
        assert_eq!(names, vec!["20250101120000_Project Alpha.txt".to_string()]);
        assert!(dir
            .path()
            .join("uploaded-docs/20250101120000_Project Alpha.txt")
            .exists());
    }

    #[tokio::test]
    async fn test_reserved_characters_survive_list_and_read() {
        let names = ["Meeting #3.txt", "Q3 [draft].txt", "100% plan.txt", "a%23b.txt"];

        let memory = StorageManager::in_memory();
        let dir = tempfile::tempdir().expect("temp dir");
        let local = StorageManager::new(&test_config_local(dir.path()))
            .await
            .expect("create storage manager");

        for storage in [memory, local] {
            for name in names {
                storage
                    .write("uploaded-docs", name, Bytes::from(name.to_string()), true)
                    .await
                    .expect("write");
            }

            let mut listed = storage.list("uploaded-docs").await.expect("list");
            listed.sort();
            let mut expected: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();
            expected.sort();
            assert_eq!(listed, expected);

            for name in &listed {
                let data = storage.read("uploaded-docs", name).await.expect("read listed name");
                assert_eq!(data.as_ref(), name.as_bytes());
            }
        }
    }

    #[test]
    fn test_resolve_base_dir_keeps_absolute_paths() {
        let cfg = AppConfig {
            data_dir: "/srv/kt-data".into(),
            ..Default::default()
        };
        assert_eq!(resolve_base_dir(&cfg), PathBuf::from("/srv/kt-data"));
    }
}
