//! Per-document execution.
//!
//! An executor runs a single document end-to-end: it drives the document's
//! plugins in declared order, reacts to the job's cancellation token,
//! persists interim state after every plugin, and streams results back to
//! the processor. The stream carries one incremental [`DocumentResult`]
//! per plugin followed by exactly one final aggregate result (empty
//! `last_plugin`); the executor closing the stream tells the processor the
//! document may be moved to a terminal location.
//!
//! The processor constructs one executor per document through an
//! [`ExecutorCreator`], so alternative implementations (out-of-process
//! execution, test doubles) slot in without touching the engine.
//!
//! [`DocumentResult`]: crate::document::DocumentResult

mod plugin;
mod plugin_executor;

pub use plugin::{
    OutputCaps, Plugin, PluginContext, PluginOutcome, PluginRegistry, PLUGIN_NAME_AGENT_UPDATE,
};
pub use plugin_executor::PluginExecutor;

use crate::document::{DocumentResult, DocumentState};
use crate::pool::CancelToken;
use crate::store::InterimStore;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of one executor's result channel.
pub const EXECUTOR_RESULT_CAPACITY: usize = 16;

/// Runs one document and streams its results.
pub trait Executor: Send + Sync {
    /// Starts execution of `document`.
    ///
    /// The returned receiver yields plugin results in declared order and a
    /// final aggregate result, then closes. Implementations persist interim
    /// state through `store` so a crash loses at most one plugin's work.
    fn run(
        &self,
        document: DocumentState,
        token: CancelToken,
        store: Arc<dyn InterimStore>,
    ) -> mpsc::Receiver<DocumentResult>;
}

/// Factory the processor calls to build one executor per document.
pub type ExecutorCreator = Arc<dyn Fn() -> Box<dyn Executor> + Send + Sync>;
