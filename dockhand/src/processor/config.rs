//! Processor configuration.

use crate::config::{
    ConfigFile, DEFAULT_CANCEL_WAIT_MS, DEFAULT_CANCEL_WORKERS, DEFAULT_COMMAND_WORKERS,
    DEFAULT_RESULT_CHANNEL_CAPACITY, DEFAULT_RETRY_LIMIT, DEFAULT_SOFT_STOP_TIMEOUT_MS,
};
use crate::document::DocumentType;
use std::time::Duration;

/// Configuration for the document processor.
///
/// The supported-type set defines the processor's domain: documents of
/// other types are left untouched during recovery and quarantined on
/// direct submission. Running two processors with overlapping domains over
/// one data root is a misconfiguration.
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Document types this processor owns.
    pub supported_types: Vec<DocumentType>,

    /// Workers in the command pool.
    pub command_workers: usize,

    /// Workers in the cancel pool.
    pub cancel_workers: usize,

    /// Recovery attempts before a document is quarantined.
    pub retry_limit: u32,

    /// Drain budget for `stop(StopType::Soft)`.
    pub soft_stop_timeout: Duration,

    /// How long a submit may block waiting for queue capacity.
    pub cancel_wait: Duration,

    /// Capacity of the shared output stream.
    pub result_channel_capacity: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            supported_types: vec![DocumentType::SendCommand, DocumentType::CancelCommand],
            command_workers: DEFAULT_COMMAND_WORKERS,
            cancel_workers: DEFAULT_CANCEL_WORKERS,
            retry_limit: DEFAULT_RETRY_LIMIT,
            soft_stop_timeout: Duration::from_millis(DEFAULT_SOFT_STOP_TIMEOUT_MS),
            cancel_wait: Duration::from_millis(DEFAULT_CANCEL_WAIT_MS),
            result_channel_capacity: DEFAULT_RESULT_CHANNEL_CAPACITY,
        }
    }
}

impl From<&ConfigFile> for ProcessorConfig {
    fn from(file: &ConfigFile) -> Self {
        Self {
            supported_types: Self::default().supported_types,
            command_workers: file.processor.command_workers,
            cancel_workers: file.processor.cancel_workers,
            retry_limit: file.processor.retry_limit,
            soft_stop_timeout: Duration::from_millis(file.processor.soft_stop_timeout_ms),
            cancel_wait: Duration::from_millis(file.pool.cancel_wait_ms),
            result_channel_capacity: file.processor.result_channel_capacity,
        }
    }
}

impl ProcessorConfig {
    /// Replaces the supported-type set.
    pub fn with_supported_types(mut self, types: Vec<DocumentType>) -> Self {
        self.supported_types = types;
        self
    }
}
