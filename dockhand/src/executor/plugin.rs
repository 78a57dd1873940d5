//! Plugin contract and registry.
//!
//! Plugins are the pluggable steps a document is made of (run a script,
//! collect inventory, update the agent, ...). The core treats their input
//! as an opaque byte payload; each plugin owns its own schema and
//! deserializes what it is handed. Plugins receive the job's cancellation
//! token and are expected to return promptly once it is set.

use crate::document::DocumentStatus;
use crate::pool::CancelToken;
use crate::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the agent self-update plugin.
///
/// Referenced by the executor's status normalization; the plugin itself
/// lives outside this crate.
pub const PLUGIN_NAME_AGENT_UPDATE: &str = "agent-update";

/// Caps applied to captured plugin output before it is persisted.
#[derive(Clone, Copy, Debug)]
pub struct OutputCaps {
    /// Maximum bytes of stdout kept per plugin.
    pub max_stdout_bytes: usize,

    /// Maximum bytes of stderr kept per plugin.
    pub max_stderr_bytes: usize,
}

impl Default for OutputCaps {
    fn default() -> Self {
        Self {
            max_stdout_bytes: crate::config::DEFAULT_MAX_STDOUT_BYTES,
            max_stderr_bytes: crate::config::DEFAULT_MAX_STDERR_BYTES,
        }
    }
}

/// Per-invocation context handed to a plugin.
#[derive(Clone, Debug)]
pub struct PluginContext {
    /// Id of the document being executed.
    pub document_id: String,

    /// Plugin instance id within the document.
    pub plugin_id: String,

    /// Output caps the executor will apply to this invocation.
    pub caps: OutputCaps,
}

/// What a plugin reports back from one invocation.
///
/// The executor stamps start/end times and applies output caps; plugins
/// only fill in what they produced.
#[derive(Clone, Debug)]
pub struct PluginOutcome {
    /// Terminal status of the invocation.
    pub status: DocumentStatus,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,

    /// Process exit code, 0 for plugins that do not shell out.
    pub exit_code: i32,

    /// Response code reported to the control plane.
    pub response_code: i32,

    /// Structured, plugin-defined output.
    pub output: Option<serde_json::Value>,
}

impl PluginOutcome {
    /// A successful invocation with no output.
    pub fn success() -> Self {
        Self::with_status(DocumentStatus::Success)
    }

    /// A failed invocation carrying an error message on stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code: 1,
            response_code: 1,
            ..Self::with_status(DocumentStatus::Failed)
        }
    }

    /// A successful invocation that requests a host reboot.
    pub fn success_and_reboot() -> Self {
        Self::with_status(DocumentStatus::SuccessAndReboot)
    }

    /// An invocation that observed its token and stopped early.
    pub fn interrupted(status: DocumentStatus) -> Self {
        Self::with_status(status)
    }

    /// Attaches captured stdout.
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Attaches structured output.
    pub fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = Some(output);
        self
    }

    fn with_status(status: DocumentStatus) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            response_code: 0,
            output: None,
        }
    }
}

/// A single executable document step.
pub trait Plugin: Send + Sync {
    /// The name documents use to refer to this plugin.
    fn name(&self) -> &str;

    /// Executes one invocation.
    ///
    /// `input` is the document's payload for this step, serialized as JSON
    /// bytes. Implementations should poll `token` around long operations
    /// and return [`PluginOutcome::interrupted`] with the matching status
    /// when it fires.
    fn execute<'a>(
        &'a self,
        input: &'a [u8],
        ctx: &'a PluginContext,
        token: &'a CancelToken,
    ) -> BoxFuture<'a, PluginOutcome>;
}

/// Name-indexed set of plugins available to the executor.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its own name, replacing any previous
    /// registration with that name.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    /// Looks up a plugin by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Returns true if a plugin with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered plugin names, in unspecified order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

/// Truncates `text` to at most `cap` bytes on a char boundary.
///
/// Returns the (possibly shortened) text and whether anything was cut.
pub(crate) fn truncate_output(mut text: String, cap: usize) -> (String, bool) {
    if text.len() <= cap {
        return (text, false);
    }
    let mut cut = cap;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    (text, true)
}
