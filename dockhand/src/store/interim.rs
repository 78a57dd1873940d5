//! Interim-state persistence seam between the executor and the store.
//!
//! The executor persists the whole document after every plugin so a crash
//! loses at most one plugin's worth of progress. It sees only this narrow
//! trait; the processor decides where the bytes actually go.

use super::file_store::FileDocumentStore;
use super::location::DocumentLocation;
use super::StoreError;
use crate::document::DocumentState;
use crate::BoxFuture;
use std::sync::Arc;

/// Write access to a document's interim state while it executes.
pub trait InterimStore: Send + Sync {
    /// Persists the document's current state.
    fn save<'a>(&'a self, doc: &'a DocumentState) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// [`InterimStore`] that writes into the *current* location of a
/// [`FileDocumentStore`], where an executing document lives.
#[derive(Clone)]
pub struct CurrentStateStore {
    store: Arc<FileDocumentStore>,
}

impl CurrentStateStore {
    /// Creates the interim store the processor hands to each executor.
    pub fn new(store: Arc<FileDocumentStore>) -> Self {
        Self { store }
    }
}

impl InterimStore for CurrentStateStore {
    fn save<'a>(&'a self, doc: &'a DocumentState) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move { self.store.persist(doc, DocumentLocation::Current).await })
    }
}
