//! Filesystem-backed document store.

use super::location::DocumentLocation;
use super::StoreError;
use crate::document::DocumentState;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document store rooted at `{data_root}/{instance_id}/`.
///
/// Concurrent operations on *different* documents are safe; the processor
/// guarantees per-document serialization by owning at most one active job
/// per document id, so this type does no per-document locking of its own.
#[derive(Clone, Debug)]
pub struct FileDocumentStore {
    root: PathBuf,
    instance_id: String,
}

impl FileDocumentStore {
    /// Creates a store for one instance under the given data root.
    ///
    /// Directories are created lazily on first write.
    pub fn new(data_root: impl Into<PathBuf>, instance_id: impl Into<String>) -> Self {
        Self {
            root: data_root.into(),
            instance_id: instance_id.into(),
        }
    }

    /// The instance this store serves.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Directory backing a location.
    pub fn location_dir(&self, location: DocumentLocation) -> PathBuf {
        self.root.join(&self.instance_id).join(location.dir_name())
    }

    /// Path of a document file at a location.
    pub fn document_path(&self, document_id: &str, location: DocumentLocation) -> PathBuf {
        self.location_dir(location).join(document_id)
    }

    /// Writes a document's state at the given location.
    ///
    /// The write is atomic: content goes to a `.tmp` sibling first and is
    /// renamed over the destination.
    pub async fn persist(
        &self,
        doc: &DocumentState,
        location: DocumentLocation,
    ) -> Result<(), StoreError> {
        let dir = self.location_dir(location);
        let path = dir.join(&doc.document_id);

        let persist_failure = |source| StoreError::PersistFailure {
            document_id: doc.document_id.clone(),
            source,
        };

        tokio::fs::create_dir_all(&dir).await.map_err(persist_failure)?;

        let payload = serde_json::to_vec_pretty(doc).map_err(|source| {
            persist_failure(std::io::Error::new(std::io::ErrorKind::InvalidData, source))
        })?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &payload)
            .await
            .map_err(persist_failure)?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(persist_failure)?;

        debug!(document_id = %doc.document_id, %location, "persisted document state");
        Ok(())
    }

    /// Moves a document between two locations via rename.
    pub async fn move_document(
        &self,
        document_id: &str,
        from: DocumentLocation,
        to: DocumentLocation,
    ) -> Result<(), StoreError> {
        let from_path = self.document_path(document_id, from);
        let to_dir = self.location_dir(to);

        tokio::fs::create_dir_all(&to_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: to_dir.clone(),
                source,
            })?;

        let to_path = to_dir.join(document_id);
        tokio::fs::rename(&from_path, &to_path)
            .await
            .map_err(|source| Self::map_read_error(source, document_id, from, &from_path))?;

        debug!(document_id, %from, %to, "moved document");
        Ok(())
    }

    /// Loads a document's state from a location.
    pub async fn load(
        &self,
        document_id: &str,
        location: DocumentLocation,
    ) -> Result<DocumentState, StoreError> {
        let path = self.document_path(document_id, location);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| Self::map_read_error(source, document_id, location, &path))?;

        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptPayload {
            document_id: document_id.to_string(),
            source,
        })
    }

    /// Lists document ids at a location, in unspecified order.
    ///
    /// In-flight `.tmp` files from interrupted atomic writes are skipped.
    pub async fn list(&self, location: DocumentLocation) -> Result<Vec<String>, StoreError> {
        let dir = self.location_dir(location);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.ends_with(".tmp") {
                continue;
            }
            ids.push(name.to_string());
        }
        Ok(ids)
    }

    /// Returns true if a location holds no documents.
    pub async fn is_empty(&self, location: DocumentLocation) -> Result<bool, StoreError> {
        Ok(self.list(location).await?.is_empty())
    }

    fn map_read_error(
        source: std::io::Error,
        document_id: &str,
        location: DocumentLocation,
        path: &Path,
    ) -> StoreError {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound {
                document_id: document_id.to_string(),
                location,
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentStatus, DocumentType};
    use tempfile::TempDir;

    fn sample_document(id: &str) -> DocumentState {
        DocumentState {
            document_id: id.to_string(),
            instance_id: "i-test".to_string(),
            message_id: format!("msg-{id}"),
            association_id: None,
            document_type: DocumentType::SendCommand,
            run_count: 0,
            status: DocumentStatus::InProgress,
            plugins: Vec::new(),
            cancel_info: None,
        }
    }

    fn test_store() -> (TempDir, FileDocumentStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path(), "i-test");
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let (_temp_dir, store) = test_store();
        let doc = sample_document("doc-1");

        store
            .persist(&doc, DocumentLocation::Pending)
            .await
            .unwrap();

        let loaded = store.load("doc-1", DocumentLocation::Pending).await.unwrap();
        assert_eq!(loaded.document_id, "doc-1");
        assert_eq!(loaded.message_id, "msg-doc-1");
    }

    #[tokio::test]
    async fn test_persist_leaves_no_temp_files() {
        let (_temp_dir, store) = test_store();
        store
            .persist(&sample_document("doc-1"), DocumentLocation::Pending)
            .await
            .unwrap();

        let ids = store.list(DocumentLocation::Pending).await.unwrap();
        assert_eq!(ids, vec!["doc-1".to_string()]);
    }

    #[tokio::test]
    async fn test_move_between_locations() {
        let (_temp_dir, store) = test_store();
        store
            .persist(&sample_document("doc-1"), DocumentLocation::Pending)
            .await
            .unwrap();

        store
            .move_document("doc-1", DocumentLocation::Pending, DocumentLocation::Current)
            .await
            .unwrap();

        assert!(store.is_empty(DocumentLocation::Pending).await.unwrap());
        let loaded = store.load("doc-1", DocumentLocation::Current).await.unwrap();
        assert_eq!(loaded.document_id, "doc-1");
    }

    #[tokio::test]
    async fn test_move_missing_document_is_not_found() {
        let (_temp_dir, store) = test_store();
        let err = store
            .move_document("ghost", DocumentLocation::Pending, DocumentLocation::Current)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_missing_document_is_not_found() {
        let (_temp_dir, store) = test_store();
        let err = store
            .load("ghost", DocumentLocation::Completed)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_unparseable_payload_is_corrupt() {
        let (_temp_dir, store) = test_store();
        let dir = store.location_dir(DocumentLocation::Pending);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("doc-bad"), b"{not json")
            .await
            .unwrap();

        let err = store
            .load("doc-bad", DocumentLocation::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CorruptPayload { .. }));
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let (_temp_dir, store) = test_store();
        assert!(store.is_empty(DocumentLocation::Corrupt).await.unwrap());
        assert!(store.list(DocumentLocation::Corrupt).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_overwrites_existing_state() {
        let (_temp_dir, store) = test_store();
        let mut doc = sample_document("doc-1");
        store
            .persist(&doc, DocumentLocation::Current)
            .await
            .unwrap();

        doc.run_count = 3;
        store
            .persist(&doc, DocumentLocation::Current)
            .await
            .unwrap();

        let loaded = store.load("doc-1", DocumentLocation::Current).await.unwrap();
        assert_eq!(loaded.run_count, 3);
    }
}
