//! The persisted document state and the results it produces.

use super::plugin::{PluginInvocation, PluginResult};
use super::status::{DocumentStatus, DocumentType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A declarative work unit dispatched to this host.
///
/// This is the exact structure serialized into the on-disk document files,
/// so field additions must stay backward-compatible (`serde(default)`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentState {
    /// Stable unique id, also the on-disk file name.
    pub document_id: String,

    /// The managed instance this document targets.
    pub instance_id: String,

    /// Per-delivery id; command cancellation targets this value.
    pub message_id: String,

    /// Present for recurring documents; when set it keys the pool job
    /// instead of `message_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_id: Option<String>,

    /// Which domain of work this document belongs to.
    pub document_type: DocumentType,

    /// Number of times execution has been attempted; incremented on each
    /// crash/reboot recovery.
    #[serde(default)]
    pub run_count: u32,

    /// Document-level aggregate status.
    #[serde(default)]
    pub status: DocumentStatus,

    /// Ordered plugin invocations.
    #[serde(default)]
    pub plugins: Vec<PluginInvocation>,

    /// Present only on cancel-documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_info: Option<CancelInfo>,
}

impl DocumentState {
    /// Returns true if this document is tied to an association (recurring).
    pub fn is_association(&self) -> bool {
        self.association_id.is_some()
    }

    /// The pool job id for this document: the association id when present,
    /// the message id otherwise.
    pub fn job_id(&self) -> &str {
        self.association_id.as_deref().unwrap_or(&self.message_id)
    }
}

/// Target and outcome of a cancel-document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CancelInfo {
    /// `message_id` of the command to cancel.
    pub cancel_message_id: String,

    /// Control-plane command id, used in the human-readable outcome.
    pub cancel_command_id: String,

    /// Human-readable outcome of the cancel attempt.
    #[serde(default)]
    pub debug_info: String,
}

/// A progress or completion report emitted while a document executes.
///
/// An empty `last_plugin` marks the single final aggregate result; every
/// other value names the plugin whose result was just produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Id of the document this result belongs to.
    pub document_id: String,

    /// Delivery id of the document, for reply routing.
    pub message_id: String,

    /// Name of the plugin that just finished, or `""` for the final
    /// whole-document result.
    pub last_plugin: String,

    /// Document-level status at the time of this report.
    pub status: DocumentStatus,

    /// All plugin results produced so far, keyed by plugin instance id.
    pub plugin_results: HashMap<String, PluginResult>,
}

impl DocumentResult {
    /// Returns true if this is the final whole-document result.
    pub fn is_final(&self) -> bool {
        self.last_plugin.is_empty()
    }
}
