//! On-disk document store.
//!
//! Every document lives in exactly one of four locations under
//! `{data_root}/{instance_id}/`:
//!
//! ```text
//! pending/     submitted, not yet picked up by a worker
//! current/     executing (or interrupted by a crash/reboot)
//! completed/   finished normally
//! corrupt/     quarantined (unreadable, over the retry limit, rejected)
//! ```
//!
//! Each file is named by its `document_id` (no extension) and contains the
//! UTF-8 JSON serialization of [`DocumentState`]. The layout is a stable
//! contract: external tooling (including `dockhand-cli`) reads it directly.
//!
//! Writes are crash-atomic at single-document granularity: content goes to
//! a `.tmp` sibling first and is renamed into place. Moves are renames
//! between sibling directories on the same filesystem.
//!
//! [`DocumentState`]: crate::document::DocumentState

mod file_store;
mod interim;
mod location;

pub use file_store::FileDocumentStore;
pub use interim::{CurrentStateStore, InterimStore};
pub use location::DocumentLocation;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing a document's interim state failed.
    #[error("failed to persist document {document_id}: {source}")]
    PersistFailure {
        /// The document being written.
        document_id: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The document does not exist at the given location.
    #[error("document {document_id} not found in {location}")]
    NotFound {
        /// The document looked up.
        document_id: String,
        /// Where it was expected.
        location: DocumentLocation,
    },

    /// The document file exists but does not deserialize. Callers are
    /// expected to move the offender to [`DocumentLocation::Corrupt`].
    #[error("document {document_id} has a corrupt payload: {source}")]
    CorruptPayload {
        /// The unreadable document.
        document_id: String,
        /// Deserialization failure.
        source: serde_json::Error,
    },

    /// Any other filesystem failure.
    #[error("store I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns true if the error means the document file was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
