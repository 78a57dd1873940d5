//! Processor struct and public API.
//!
//! Job-body implementations live in sibling modules: `command` (run a
//! document), `cancel` (cancel a previously submitted document), and
//! `recovery` (re-enqueue interrupted and never-started documents on
//! start).

use super::cancel::process_cancel_command;
use super::command::process_command;
use super::config::ProcessorConfig;
use super::hook::{NullResultHook, ResultHook};
use crate::document::{DocumentResult, DocumentState, DocumentType};
use crate::executor::ExecutorCreator;
use crate::pool::{JobBody, PoolError, WorkerPool};
use crate::rebooter::Rebooter;
use crate::store::{DocumentLocation, FileDocumentStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Drain budget applied to both pools on a hard stop.
pub const HARD_STOP_TIMEOUT: Duration = Duration::from_secs(4);

/// How to stop the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopType {
    /// Graceful: drain budget comes from configuration.
    Soft,

    /// Forced: fixed 4-second drain budget.
    Hard,
}

impl std::fmt::Display for StopType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soft => write!(f, "soft"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Errors surfaced by the processor's public API.
///
/// Everything else (persistence failures, plugin failures, unreadable
/// documents) is absorbed into document state and observable through the
/// on-disk location and the result stream.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The processor has been stopped; no further work is accepted.
    #[error("processor is stopped")]
    Stopped,

    /// `start` was called again after the result stream was handed out.
    #[error("the result stream has already been taken")]
    StreamTaken,

    /// A pool rejected the job; the document has been quarantined.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Two-pool, persistence-backed document engine.
///
/// Documents enter through [`submit`] (or [`cancel`] for cancel-documents),
/// are persisted to the *pending* location, and run on a bounded command
/// pool. Every state transition is persisted so execution survives process
/// crashes and host reboots; [`start`] replays whatever the last run left
/// behind. Results from all documents are multiplexed onto the single
/// receiver [`start`] returns.
///
/// All collaborators are injected: the store, the reboot latch, and the
/// executor factory. There is no process-global state.
///
/// [`submit`]: Processor::submit
/// [`cancel`]: Processor::cancel
/// [`start`]: Processor::start
pub struct Processor {
    pub(crate) config: ProcessorConfig,
    pub(crate) store: Arc<FileDocumentStore>,
    pub(crate) rebooter: Arc<dyn Rebooter>,
    pub(crate) executor_creator: ExecutorCreator,
    pub(crate) hook: Arc<dyn ResultHook>,
    pub(crate) command_pool: WorkerPool,
    pub(crate) cancel_pool: WorkerPool,
    result_tx: Mutex<Option<mpsc::Sender<DocumentResult>>>,
    result_rx: Mutex<Option<mpsc::Receiver<DocumentResult>>>,
    recovered: AtomicBool,
    stopped: AtomicBool,
}

impl Processor {
    /// Creates a processor over the given store.
    ///
    /// Both worker pools start immediately but stay idle until documents
    /// are submitted or recovered.
    pub fn new(
        config: ProcessorConfig,
        store: Arc<FileDocumentStore>,
        rebooter: Arc<dyn Rebooter>,
        executor_creator: ExecutorCreator,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(config.result_channel_capacity);
        let command_pool = WorkerPool::new("command", config.command_workers, config.cancel_wait);
        let cancel_pool = WorkerPool::new("cancel", config.cancel_workers, config.cancel_wait);

        Self {
            config,
            store,
            rebooter,
            executor_creator,
            hook: Arc::new(NullResultHook),
            command_pool,
            cancel_pool,
            result_tx: Mutex::new(Some(result_tx)),
            result_rx: Mutex::new(Some(result_rx)),
            recovered: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Installs a post-result hook, invoked with every result before it is
    /// forwarded to the output stream.
    pub fn with_result_hook(mut self, hook: Arc<dyn ResultHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Activates the processor: recovers documents left over from the last
    /// run (*current* first, then *pending*) and returns the output stream.
    ///
    /// Recovery runs once; calling `start` again is harmless but yields
    /// [`ProcessorError::StreamTaken`] because the single consumer receiver
    /// has already been handed out.
    pub async fn start(&self) -> Result<mpsc::Receiver<DocumentResult>, ProcessorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ProcessorError::Stopped);
        }

        if !self.recovered.swap(true, Ordering::SeqCst) {
            // In-flight work takes precedence over never-started work.
            self.recover_in_progress_documents().await;
            self.recover_pending_documents().await;
        }

        self.result_rx
            .lock()
            .expect("result receiver lock poisoned")
            .take()
            .ok_or(ProcessorError::StreamTaken)
    }

    /// Submits a document for execution.
    ///
    /// The document is persisted to *pending* before it is enqueued. Pool
    /// rejection (duplicate job id, saturation, shutdown) quarantines the
    /// document and surfaces the error; persistence problems are logged
    /// and absorbed.
    pub async fn submit(&self, doc: DocumentState) -> Result<(), ProcessorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ProcessorError::Stopped);
        }

        let document_id = doc.document_id.clone();
        info!(
            document_id = %document_id,
            document_type = %doc.document_type,
            "submitting document"
        );

        if let Err(err) = self.store.persist(&doc, DocumentLocation::Pending).await {
            error!(
                document_id = %document_id,
                error = %err,
                "failed to persist pending document"
            );
        }

        if !self.is_supported(doc.document_type) {
            warn!(
                document_id = %document_id,
                document_type = %doc.document_type,
                "unsupported document type, quarantining"
            );
            self.quarantine(&document_id, DocumentLocation::Pending)
                .await;
            return Ok(());
        }

        if let Err(err) = self.enqueue_command(doc).await {
            error!(
                document_id = %document_id,
                error = %err,
                "document submission failed"
            );
            self.quarantine(&document_id, DocumentLocation::Pending)
                .await;
            return Err(err);
        }
        Ok(())
    }

    /// Submits a cancel-document.
    ///
    /// The cancel job asks the command pool to cancel the job whose id
    /// equals the cancel-document's `cancel_message_id`, records the
    /// outcome in the cancel-document's `debug_info`, and completes it.
    pub async fn cancel(&self, doc: DocumentState) -> Result<(), ProcessorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ProcessorError::Stopped);
        }

        let document_id = doc.document_id.clone();
        info!(document_id = %document_id, "submitting cancel document");

        if let Err(err) = self.store.persist(&doc, DocumentLocation::Pending).await {
            error!(
                document_id = %document_id,
                error = %err,
                "failed to persist pending cancel document"
            );
        }

        let job_id = doc.job_id().to_string();
        let store = Arc::clone(&self.store);
        let command_pool = self.command_pool.clone();
        let body: JobBody = Box::new(move |_token| {
            Box::pin(process_cancel_command(store, command_pool, doc))
        });

        if let Err(err) = self.cancel_pool.submit(&job_id, body).await {
            error!(
                document_id = %document_id,
                error = %err,
                "cancel submission failed"
            );
            self.quarantine(&document_id, DocumentLocation::Pending)
                .await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Stops the processor: shuts both pools down in parallel, waits up to
    /// the stop-type's timeout, then closes the output stream. Further
    /// `submit`/`cancel` calls fail with [`ProcessorError::Stopped`].
    pub async fn stop(&self, stop_type: StopType) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let timeout = match stop_type {
            StopType::Soft => self.config.soft_stop_timeout,
            StopType::Hard => HARD_STOP_TIMEOUT,
        };
        info!(
            stop_type = %stop_type,
            timeout_ms = timeout.as_millis() as u64,
            "stopping processor"
        );

        tokio::join!(
            self.command_pool.shutdown_and_wait(timeout),
            self.cancel_pool.shutdown_and_wait(timeout),
        );

        // Close the output stream only after both pools are quiet so no
        // producer is left holding a sender.
        self.result_tx
            .lock()
            .expect("result sender lock poisoned")
            .take();
    }

    /// Enqueues a command job for a document already persisted on disk.
    pub(crate) async fn enqueue_command(&self, doc: DocumentState) -> Result<(), ProcessorError> {
        let job_id = doc.job_id().to_string();
        let result_tx = self
            .result_tx
            .lock()
            .expect("result sender lock poisoned")
            .clone()
            .ok_or(ProcessorError::Stopped)?;

        let store = Arc::clone(&self.store);
        let executor_creator = self.executor_creator.clone();
        let rebooter = Arc::clone(&self.rebooter);
        let hook = Arc::clone(&self.hook);
        let body: JobBody = Box::new(move |token| {
            Box::pin(process_command(
                store,
                executor_creator,
                rebooter,
                hook,
                result_tx,
                doc,
                token,
            ))
        });

        self.command_pool.submit(&job_id, body).await?;
        Ok(())
    }

    /// True if the document type belongs to this processor's domain.
    pub(crate) fn is_supported(&self, document_type: DocumentType) -> bool {
        self.config.supported_types.contains(&document_type)
    }

    /// Moves a misbehaving document to *corrupt*, absorbing any failure.
    pub(crate) async fn quarantine(&self, document_id: &str, from: DocumentLocation) {
        if let Err(err) = self
            .store
            .move_document(document_id, from, DocumentLocation::Corrupt)
            .await
        {
            error!(
                document_id,
                error = %err,
                "failed to quarantine document"
            );
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("supported_types", &self.config.supported_types)
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
