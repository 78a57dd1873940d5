//! Dockhand - host-side execution of remotely dispatched documents
//!
//! This library is the core of an agent that pulls declarative "documents"
//! from a control plane and runs them on a managed instance. A document is
//! an id, a type tag, and an ordered list of plugin invocations; the
//! [`processor::Processor`] schedules documents on bounded worker pools,
//! persists every state transition to disk, streams intermediate results,
//! honors targeted cancellation, and resumes interrupted work after a
//! crash or a host reboot.
//!
//! # High-Level API
//!
//! ```ignore
//! use dockhand::clock::SystemClock;
//! use dockhand::executor::{OutputCaps, PluginExecutor, PluginRegistry};
//! use dockhand::processor::{Processor, ProcessorConfig, StopType};
//! use dockhand::rebooter::RebootLatch;
//! use dockhand::store::FileDocumentStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileDocumentStore::new("/var/lib/dockhand", "i-0abc123"));
//! let registry = Arc::new(build_plugin_registry());
//! let creator = PluginExecutor::creator(registry, OutputCaps::default(), Arc::new(SystemClock));
//!
//! let processor = Processor::new(
//!     ProcessorConfig::default(),
//!     store,
//!     Arc::new(RebootLatch::new()),
//!     creator,
//! );
//!
//! let mut results = processor.start().await?;
//! processor.submit(document).await?;
//! while let Some(result) = results.recv().await {
//!     // forward to the control plane
//! }
//! processor.stop(StopType::Soft).await;
//! ```

pub mod clock;
pub mod config;
pub mod document;
pub mod executor;
pub mod logging;
pub mod pool;
pub mod processor;
pub mod rebooter;
pub mod store;

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by object-safe async traits in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Version of the dockhand library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
