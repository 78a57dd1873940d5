//! Bounded worker pools with job-targeted cancellation.
//!
//! The processor owns two of these (command and cancel). Each pool keeps a
//! FIFO queue of job bodies keyed by job id, dispatches them to a bounded
//! set of workers in submission order, and supports:
//!
//! - **targeted cancel**: a queued job is removed, a running job has its
//!   [`CancelToken`] flipped to `Cancelled`;
//! - **graceful shutdown**: every token flips to `Shutdown` (a distinct
//!   state so plugins can tell orderly shutdown from user cancellation),
//!   intake stops, and the pool drains with a timeout.
//!
//! Two jobs on two workers may interleave arbitrarily; the only ordering
//! guarantee is dispatch in submission order within one pool.

mod token;
mod worker_pool;

pub use token::{CancelToken, TokenState};
pub use worker_pool::{JobBody, PoolError, WorkerPool, JOB_QUEUE_CAPACITY};
