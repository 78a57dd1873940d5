//! The document processor: the engine's public API.
//!
//! The processor owns two bounded [`WorkerPool`]s (one for command
//! documents, one for cancel-documents) and a single multi-producer
//! output stream of [`DocumentResult`]s. Around each executor run it
//! drives the on-disk state machine:
//!
//! ```text
//!               submit                    job picked up
//!   (caller) ────────────► pending/ ────────────────► current/
//!                             │                          │
//!                   rejected  │                 finished │   reboot requested
//!                             ▼                          ▼        (stays put)
//!                          corrupt/                  completed/
//! ```
//!
//! On [`start`](Processor::start) the processor first re-enqueues
//! *current* documents (interrupted mid-run, `run_count` incremented, over
//! the retry limit → *corrupt*), then *pending* ones, and returns the
//! output stream.
//!
//! [`WorkerPool`]: crate::pool::WorkerPool
//! [`DocumentResult`]: crate::document::DocumentResult

mod cancel;
mod command;
mod config;
mod core;
mod hook;
mod recovery;

pub use self::config::ProcessorConfig;
pub use self::core::{Processor, ProcessorError, StopType, HARD_STOP_TIMEOUT};
pub use self::hook::{MultiplexResultHook, NullResultHook, ResultHook};
