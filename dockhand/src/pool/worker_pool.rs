//! Bounded worker pool with targeted cancel and graceful shutdown.

use super::token::CancelToken;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Capacity of the pending-job queue.
pub const JOB_QUEUE_CAPACITY: usize = 256;

/// A job body: receives its cancellation token when a worker picks it up.
pub type JobBody =
    Box<dyn FnOnce(CancelToken) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Errors from [`WorkerPool::submit`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// A job with the same id is already queued or running.
    #[error("job {job_id} is already queued or running")]
    DuplicateJobId {
        /// The rejected job id.
        job_id: String,
    },

    /// The pool is shutting down and accepts no new work.
    #[error("worker pool is shutting down")]
    PoolShutdown,

    /// The queue stayed full for the whole cancel-wait window.
    #[error("worker pool queue is full")]
    QueueFull,
}

/// Tracking state for a job known to the pool.
enum JobEntry {
    /// Waiting in the queue.
    Queued(CancelToken),

    /// Picked up by a worker.
    Running(CancelToken),

    /// Cancelled while queued; the dispatcher drops it on dequeue.
    Removed,
}

struct QueuedJob {
    job_id: String,
    body: JobBody,
    token: CancelToken,
}

struct PoolInner {
    name: String,
    job_tx: mpsc::Sender<QueuedJob>,
    jobs: Mutex<HashMap<String, JobEntry>>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    cancel_wait: Duration,
}

/// Bounded FIFO pool of workers keyed by job id.
///
/// Jobs are dispatched in submission order; up to `workers` of them run
/// concurrently. Each job gets a [`CancelToken`] that [`cancel`] flips to
/// `Cancelled` and [`shutdown_and_wait`] flips to `Shutdown`; job bodies
/// poll the token at coarse checkpoints and return promptly.
///
/// Cloning is cheap and clones share the same pool.
///
/// [`cancel`]: WorkerPool::cancel
/// [`shutdown_and_wait`]: WorkerPool::shutdown_and_wait
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Creates a pool with `workers` concurrent workers.
    ///
    /// `cancel_wait` bounds how long [`submit`](WorkerPool::submit) blocks
    /// for queue capacity before giving up with [`PoolError::QueueFull`].
    ///
    /// Spawns the dispatcher task, so this must be called from within a
    /// Tokio runtime.
    pub fn new(name: impl Into<String>, workers: usize, cancel_wait: Duration) -> Self {
        let (job_tx, job_rx) = mpsc::channel(JOB_QUEUE_CAPACITY);
        let inner = Arc::new(PoolInner {
            name: name.into(),
            job_tx,
            jobs: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            cancel_wait,
        });

        tokio::spawn(dispatch_loop(Arc::clone(&inner), job_rx, workers.max(1)));
        Self { inner }
    }

    /// The pool's name, used in logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True once shutdown has been initiated.
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Number of jobs currently queued or running.
    pub async fn job_count(&self) -> usize {
        self.inner.jobs.lock().await.len()
    }

    /// Enqueues a job, blocking up to the cancel-wait window if the queue
    /// is full.
    ///
    /// Job ids must be unique among queued and running jobs; duplicates are
    /// rejected so a re-delivered document cannot run twice concurrently.
    pub async fn submit(&self, job_id: &str, body: JobBody) -> Result<(), PoolError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(PoolError::PoolShutdown);
        }

        let token = CancelToken::new();
        {
            let mut jobs = self.inner.jobs.lock().await;
            if jobs.contains_key(job_id) {
                return Err(PoolError::DuplicateJobId {
                    job_id: job_id.to_string(),
                });
            }
            jobs.insert(job_id.to_string(), JobEntry::Queued(token.clone()));
        }

        let queued = QueuedJob {
            job_id: job_id.to_string(),
            body,
            token,
        };

        match tokio::time::timeout(self.inner.cancel_wait, self.inner.job_tx.send(queued)).await {
            Ok(Ok(())) => {
                debug!(pool = %self.inner.name, job_id, "job queued");
                Ok(())
            }
            Ok(Err(_)) => {
                self.forget(job_id).await;
                Err(PoolError::PoolShutdown)
            }
            Err(_) => {
                warn!(pool = %self.inner.name, job_id, "queue full, rejecting job");
                self.forget(job_id).await;
                Err(PoolError::QueueFull)
            }
        }
    }

    /// Cancels the job with the given id.
    ///
    /// Returns `true` if the job was found queued (it is removed without
    /// running) or running (its token is flipped to `Cancelled`); `false`
    /// if no such job exists, e.g. because it already completed.
    pub async fn cancel(&self, job_id: &str) -> bool {
        let mut jobs = self.inner.jobs.lock().await;
        let found = match jobs.get(job_id) {
            Some(JobEntry::Queued(token)) => Some((token.clone(), true)),
            Some(JobEntry::Running(token)) => Some((token.clone(), false)),
            Some(JobEntry::Removed) | None => None,
        };
        let Some((token, was_queued)) = found else {
            return false;
        };

        if was_queued {
            jobs.insert(job_id.to_string(), JobEntry::Removed);
            token.cancel();
            debug!(pool = %self.inner.name, job_id, "cancelled queued job");
        } else {
            token.cancel();
            debug!(pool = %self.inner.name, job_id, "cancelled running job");
        }
        true
    }

    /// Shuts the pool down: signals every job token `Shutdown`, stops
    /// accepting work, and waits up to `timeout` for running jobs to
    /// drain. Jobs still running after the timeout are abandoned.
    ///
    /// Returns `true` if the pool drained within the timeout.
    pub async fn shutdown_and_wait(&self, timeout: Duration) -> bool {
        info!(pool = %self.inner.name, "shutting down worker pool");
        self.inner.shutdown.cancel();

        {
            let jobs = self.inner.jobs.lock().await;
            for entry in jobs.values() {
                match entry {
                    JobEntry::Queued(token) | JobEntry::Running(token) => token.shutdown(),
                    JobEntry::Removed => {}
                }
            }
        }

        self.inner.tracker.close();
        match tokio::time::timeout(timeout, self.inner.tracker.wait()).await {
            Ok(()) => {
                debug!(pool = %self.inner.name, "worker pool drained");
                true
            }
            Err(_) => {
                warn!(
                    pool = %self.inner.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "worker pool drain timed out, abandoning outstanding jobs"
                );
                false
            }
        }
    }

    async fn forget(&self, job_id: &str) {
        self.inner.jobs.lock().await.remove(job_id);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.inner.name)
            .field("is_shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

/// Pops jobs in FIFO order and runs them on up to `workers` concurrent
/// tasks. Exits when the pool shuts down or every submitter is gone.
///
/// A job is only taken off the queue once a worker slot is free, so a job
/// stays cancellable-as-queued until a worker can actually start it.
async fn dispatch_loop(
    inner: Arc<PoolInner>,
    mut job_rx: mpsc::Receiver<QueuedJob>,
    workers: usize,
) {
    let semaphore = Arc::new(Semaphore::new(workers));

    loop {
        let permit = tokio::select! {
            biased;

            _ = inner.shutdown.cancelled() => break,

            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let queued = tokio::select! {
            biased;

            _ = inner.shutdown.cancelled() => break,

            queued = job_rx.recv() => match queued {
                Some(queued) => queued,
                None => break,
            },
        };

        // A job cancelled while queued is dropped here without running.
        let run = {
            let mut jobs = inner.jobs.lock().await;
            let still_queued = matches!(jobs.get(&queued.job_id), Some(JobEntry::Queued(_)));
            if still_queued {
                jobs.insert(
                    queued.job_id.clone(),
                    JobEntry::Running(queued.token.clone()),
                );
            } else {
                jobs.remove(&queued.job_id);
            }
            still_queued
        };
        if !run {
            debug!(pool = %inner.name, job_id = %queued.job_id, "dropping removed job");
            continue;
        }

        let pool = Arc::clone(&inner);
        let QueuedJob { job_id, body, token } = queued;
        inner.tracker.spawn(async move {
            debug!(pool = %pool.name, job_id = %job_id, "job started");
            body(token).await;
            pool.jobs.lock().await.remove(&job_id);
            drop(permit);
            debug!(pool = %pool.name, job_id = %job_id, "job finished");
        });
    }
}
