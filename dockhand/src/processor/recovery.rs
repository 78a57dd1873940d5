//! Start-time recovery of interrupted and never-started documents.

use super::core::Processor;
use crate::document::DocumentType;
use crate::store::DocumentLocation;
use tracing::{debug, error, warn};

impl Processor {
    /// Re-enqueues documents found in *current*: work that was interrupted
    /// by a crash or a reboot.
    ///
    /// Every readable document gets its `run_count` incremented and
    /// persisted; documents at or over the retry limit are quarantined
    /// instead of re-enqueued. Documents of unsupported types are left
    /// where they are; a processor in another domain owns them.
    pub(crate) async fn recover_in_progress_documents(&self) {
        let location = DocumentLocation::Current;
        let ids = match self.store.list(location).await {
            Ok(ids) => ids,
            Err(err) => {
                error!(error = %err, "skipping in-progress recovery, cannot list current documents");
                return;
            }
        };
        if ids.is_empty() {
            debug!("no in-progress documents to recover");
            return;
        }

        for document_id in ids {
            debug!(document_id = %document_id, "processing previously interrupted document");

            let mut doc = match self.store.load(&document_id, location).await {
                Ok(doc) => doc,
                Err(err) => {
                    error!(
                        document_id = %document_id,
                        error = %err,
                        "unreadable in-progress document, quarantining"
                    );
                    self.quarantine(&document_id, location).await;
                    continue;
                }
            };

            if doc.run_count >= self.config.retry_limit {
                warn!(
                    document_id = %document_id,
                    run_count = doc.run_count,
                    retry_limit = self.config.retry_limit,
                    "retry limit reached, quarantining"
                );
                self.quarantine(&document_id, location).await;
                continue;
            }

            doc.run_count += 1;
            if let Err(err) = self.store.persist(&doc, location).await {
                error!(
                    document_id = %document_id,
                    error = %err,
                    "failed to persist incremented run count"
                );
            }

            if !self.is_supported(doc.document_type) {
                debug!(
                    document_id = %document_id,
                    document_type = %doc.document_type,
                    "unsupported type, leaving document in place"
                );
                continue;
            }

            debug!(document_id = %document_id, "re-enqueueing in-progress document");
            if let Err(err) = self.enqueue_command(doc).await {
                error!(
                    document_id = %document_id,
                    error = %err,
                    "failed to re-enqueue in-progress document, quarantining"
                );
                self.quarantine(&document_id, location).await;
            }
        }
    }

    /// Enqueues documents found in *pending*: submitted before the last
    /// shutdown but never picked up by a worker.
    pub(crate) async fn recover_pending_documents(&self) {
        let location = DocumentLocation::Pending;
        let ids = match self.store.list(location).await {
            Ok(ids) => ids,
            Err(err) => {
                error!(error = %err, "skipping pending recovery, cannot list pending documents");
                return;
            }
        };
        if ids.is_empty() {
            debug!("no pending documents to recover");
            return;
        }

        for document_id in ids {
            debug!(document_id = %document_id, "processing pending document");

            let doc = match self.store.load(&document_id, location).await {
                Ok(doc) => doc,
                Err(err) => {
                    error!(
                        document_id = %document_id,
                        error = %err,
                        "unreadable pending document, quarantining"
                    );
                    self.quarantine(&document_id, location).await;
                    continue;
                }
            };

            if !self.is_supported(doc.document_type) {
                debug!(
                    document_id = %document_id,
                    document_type = %doc.document_type,
                    "unsupported type, leaving document in place"
                );
                continue;
            }

            // Cancel-documents go back through the cancel pool, everything
            // else through the command pool.
            let outcome = if doc.document_type == DocumentType::CancelCommand {
                self.cancel(doc).await
            } else {
                self.submit(doc).await
            };
            if let Err(err) = outcome {
                error!(
                    document_id = %document_id,
                    error = %err,
                    "failed to re-enqueue pending document"
                );
            }
        }
    }
}
