//! Command job body: run one document through an executor.

use super::hook::ResultHook;
use crate::document::{DocumentResult, DocumentState, DocumentStatus};
use crate::executor::ExecutorCreator;
use crate::pool::CancelToken;
use crate::rebooter::Rebooter;
use crate::store::{CurrentStateStore, DocumentLocation, FileDocumentStore, InterimStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Runs one document: moves it to *current*, drains the executor's result
/// stream into the shared output stream, and moves it to *completed*. When
/// a plugin asked for a reboot it instead leaves the document in *current*
/// and latches a pending reboot, so the next start resumes it.
pub(crate) async fn process_command(
    store: Arc<FileDocumentStore>,
    executor_creator: ExecutorCreator,
    rebooter: Arc<dyn Rebooter>,
    hook: Arc<dyn ResultHook>,
    result_tx: mpsc::Sender<DocumentResult>,
    doc: DocumentState,
    token: CancelToken,
) {
    let document_id = doc.document_id.clone();
    let message_id = doc.message_id.clone();

    match store
        .move_document(&document_id, DocumentLocation::Pending, DocumentLocation::Current)
        .await
    {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {
            // Recovered documents are already in current.
            debug!(document_id = %document_id, "document not in pending, resuming from current");
        }
        Err(err) => {
            warn!(
                document_id = %document_id,
                error = %err,
                "failed to move document to current"
            );
        }
    }

    debug!(document_id = %document_id, "running executor");
    let executor = (executor_creator)();
    let interim: Arc<dyn InterimStore> = Arc::new(CurrentStateStore::new(Arc::clone(&store)));
    let mut results = executor.run(doc, token, interim);

    let mut reboot = false;
    while let Some(result) = results.recv().await {
        if result.is_final() {
            info!(
                document_id = %document_id,
                status = %result.status,
                "sending document complete response"
            );
        } else {
            info!(
                document_id = %document_id,
                plugin = %result.last_plugin,
                "sending reply for plugin update"
            );
        }

        hook.on_result(&result);
        reboot = result.status == DocumentStatus::SuccessAndReboot;

        if result_tx.send(result).await.is_err() {
            warn!(document_id = %document_id, "result stream closed, dropping result");
        }
    }

    if reboot {
        info!(
            message_id = %message_id,
            "document requested reboot, leaving in current to resume"
        );
        rebooter.request_pending_reboot();
        return;
    }

    debug!(
        document_id = %document_id,
        "execution is over, moving document from current to completed"
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
            "failed to move document to completed"
        );
    }
}
