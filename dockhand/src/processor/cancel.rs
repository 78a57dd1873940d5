//! Cancel job body: probe the command pool for the target job.

use crate::document::{DocumentState, DocumentStatus};
use crate::pool::WorkerPool;
use crate::store::{DocumentLocation, FileDocumentStore};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Processes a cancel-document: asks the command pool to cancel the job
/// keyed by `cancel_message_id`, records the outcome in the document's
/// `debug_info`, and completes the cancel-document.
///
/// A cancel that misses (the target already finished, or was never
/// submitted) is not an error of the cancel job itself; the cancel-document
/// simply completes with status `Failed` and an explanatory `debug_info`.
pub(crate) async fn process_cancel_command(
    store: Arc<FileDocumentStore>,
    command_pool: WorkerPool,
    mut doc: DocumentState,
) {
    let document_id = doc.document_id.clone();

    let Some(info) = doc.cancel_info.clone() else {
        warn!(
            document_id = %document_id,
            "cancel document names no target, quarantining"
        );
        if let Err(err) = store
            .move_document(
                &document_id,
                DocumentLocation::Pending,
                DocumentLocation::Corrupt,
            )
            .await
        {
            error!(document_id = %document_id, error = %err, "failed to quarantine cancel document");
        }
        return;
    };

    if let Err(err) = store
        .move_document(&document_id, DocumentLocation::Pending, DocumentLocation::Current)
        .await
    {
        warn!(
            document_id = %document_id,
            error = %err,
            "failed to move cancel document to current"
        );
    }

    debug!(cancel_message_id = %info.cancel_message_id, "cancelling job");

    let found = command_pool.cancel(&info.cancel_message_id).await;
    let (debug_info, status) = if found {
        (
            format!("Command {} cancelled", info.cancel_command_id),
            DocumentStatus::Success,
        )
    } else {
        debug!(
            cancel_message_id = %info.cancel_message_id,
            "job not found (possibly completed)"
        );
        (
            format!("Command {} couldn't be cancelled", info.cancel_command_id),
            DocumentStatus::Failed,
        )
    };

    if let Some(cancel_info) = doc.cancel_info.as_mut() {
        cancel_info.debug_info = debug_info;
    }
    doc.status = status;

    if let Err(err) = store.persist(&doc, DocumentLocation::Current).await {
        error!(
            document_id = %document_id,
            error = %err,
            "failed to persist cancel outcome"
        );
    }

    debug!(
        document_id = %document_id,
        "cancel is over, moving document from current to completed"
    );
    if let Err(err) = store
        .move_document(
            &document_id,
            DocumentLocation::Current,
            DocumentLocation::Completed,
        )
        .await
    {
        error!(
            document_id = %document_id,
            error = %err,
            "failed to move cancel document to completed"
        );
    }
}
