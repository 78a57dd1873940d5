//! Plugin invocation records and their result slots.

use super::status::DocumentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of a document: which plugin to run and with what input.
///
/// The `input` payload is structurally opaque to the processor core; it is
/// re-serialized and handed to the plugin, which owns its own schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PluginInvocation {
    /// Plugin instance id, unique within the document. Keys the entry in
    /// [`DocumentResult::plugin_results`](super::DocumentResult).
    pub id: String,

    /// Registered plugin name to invoke.
    pub name: String,

    /// Opaque input payload for the plugin.
    #[serde(default)]
    pub input: serde_json::Value,

    /// Result slot, filled once the plugin has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PluginResult>,
}

impl PluginInvocation {
    /// Creates an invocation whose instance id equals the plugin name.
    ///
    /// Documents with a single instance of each plugin use this form; when
    /// the same plugin appears twice the dispatcher assigns distinct ids.
    pub fn new(name: impl Into<String>, input: serde_json::Value) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            input,
            result: None,
        }
    }
}

/// Outcome of a single plugin invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PluginResult {
    /// Name of the plugin that produced this result.
    pub plugin_name: String,

    /// Terminal status of the invocation.
    pub status: DocumentStatus,

    /// Captured standard output, possibly truncated to the configured cap.
    #[serde(default)]
    pub stdout: String,

    /// Captured standard error, possibly truncated to the configured cap.
    #[serde(default)]
    pub stderr: String,

    /// Process exit code, or 0 for plugins that do not shell out.
    #[serde(default)]
    pub exit_code: i32,

    /// Response code reported back to the control plane.
    #[serde(default)]
    pub response_code: i32,

    /// Structured output payload, plugin-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// When the invocation started.
    pub start_time: DateTime<Utc>,

    /// When the invocation finished.
    pub end_time: DateTime<Utc>,

    /// True if `stdout` was cut at the configured cap.
    #[serde(default)]
    pub standard_output_truncated: bool,

    /// True if `stderr` was cut at the configured cap.
    #[serde(default)]
    pub standard_error_truncated: bool,
}
