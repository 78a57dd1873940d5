//! Default executor: drives a document's plugins in declared order.

use super::plugin::{
    truncate_output, OutputCaps, PluginContext, PluginOutcome, PluginRegistry,
    PLUGIN_NAME_AGENT_UPDATE,
};
use super::{Executor, ExecutorCreator, EXECUTOR_RESULT_CAPACITY};
use crate::clock::Clock;
use crate::document::{DocumentResult, DocumentState, DocumentStatus, PluginResult};
use crate::pool::{CancelToken, TokenState};
use crate::store::InterimStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Runs plugins from a [`PluginRegistry`] sequentially, persisting the
/// document after every plugin and streaming one incremental result per
/// plugin plus a single final aggregate result.
pub struct PluginExecutor {
    registry: Arc<PluginRegistry>,
    caps: OutputCaps,
    clock: Arc<dyn Clock>,
}

impl PluginExecutor {
    /// Creates an executor over the given plugin set.
    pub fn new(registry: Arc<PluginRegistry>, caps: OutputCaps, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            caps,
            clock,
        }
    }

    /// Returns a factory the processor can call once per document.
    pub fn creator(
        registry: Arc<PluginRegistry>,
        caps: OutputCaps,
        clock: Arc<dyn Clock>,
    ) -> ExecutorCreator {
        Arc::new(move || {
            Box::new(PluginExecutor::new(
                Arc::clone(&registry),
                caps,
                Arc::clone(&clock),
            ))
        })
    }
}

impl Executor for PluginExecutor {
    fn run(
        &self,
        document: DocumentState,
        token: CancelToken,
        store: Arc<dyn InterimStore>,
    ) -> mpsc::Receiver<DocumentResult> {
        let (tx, rx) = mpsc::channel(EXECUTOR_RESULT_CAPACITY);
        let registry = Arc::clone(&self.registry);
        let caps = self.caps;
        let clock = Arc::clone(&self.clock);

        tokio::spawn(run_document(registry, caps, clock, document, token, store, tx));
        rx
    }
}

/// Executes a whole document. The result channel closes when this returns,
/// which the processor takes as "the document is done, move it".
async fn run_document(
    registry: Arc<PluginRegistry>,
    caps: OutputCaps,
    clock: Arc<dyn Clock>,
    mut doc: DocumentState,
    token: CancelToken,
    store: Arc<dyn InterimStore>,
    tx: mpsc::Sender<DocumentResult>,
) {
    let document_id = doc.document_id.clone();
    doc.status = DocumentStatus::InProgress;

    // A previous run that ended in a reboot leaves a SuccessAndReboot slot
    // behind; by the time this run starts the reboot has happened, so the
    // request is satisfied and the slot settles to Success.
    for invocation in &mut doc.plugins {
        if let Some(result) = &mut invocation.result {
            if result.status == DocumentStatus::SuccessAndReboot {
                result.status = DocumentStatus::Success;
            }
        }
    }

    let mut reboot = false;
    for idx in 0..doc.plugins.len() {
        // Plugins completed in a previous run are not run again.
        if doc.plugins[idx]
            .result
            .as_ref()
            .is_some_and(|r| r.status == DocumentStatus::Success)
        {
            debug!(
                document_id = %document_id,
                plugin = %doc.plugins[idx].name,
                "skipping already-completed plugin"
            );
            continue;
        }

        let state = token.state();
        if state.is_set() {
            let status = match state {
                TokenState::Cancelled => DocumentStatus::Cancelled,
                _ => DocumentStatus::Shutdown,
            };
            debug!(document_id = %document_id, %status, "halting before plugin");
            mark_unfinished(&mut doc, idx, status, clock.as_ref());
            save_interim(&store, &doc).await;
            break;
        }

        let invocation = &doc.plugins[idx];
        let ctx = PluginContext {
            document_id: document_id.clone(),
            plugin_id: invocation.id.clone(),
            caps,
        };
        let started = clock.now();

        let outcome = match registry.get(&invocation.name) {
            Some(plugin) => {
                debug!(
                    document_id = %document_id,
                    plugin = %invocation.name,
                    "invoking plugin"
                );
                let input = serde_json::to_vec(&invocation.input).unwrap_or_default();
                plugin.execute(&input, &ctx, &token).await
            }
            None => {
                warn!(
                    document_id = %document_id,
                    plugin = %invocation.name,
                    "plugin is not registered"
                );
                PluginOutcome::failed(format!("plugin {} is not registered", invocation.name))
            }
        };

        let result = seal_outcome(
            invocation.name.clone(),
            outcome,
            started,
            clock.now(),
            caps,
        );
        reboot = result.status == DocumentStatus::SuccessAndReboot;

        let plugin_name = doc.plugins[idx].name.clone();
        doc.plugins[idx].result = Some(result);
        save_interim(&store, &doc).await;

        let update = progress_result(&doc, plugin_name, DocumentStatus::InProgress);
        if tx.send(update).await.is_err() {
            // Consumer is gone; nothing left to report to.
            return;
        }

        if reboot {
            break;
        }
    }

    let aggregate = if reboot {
        DocumentStatus::SuccessAndReboot
    } else {
        aggregate_status(&doc)
    };
    doc.status = aggregate;
    save_interim(&store, &doc).await;

    let final_result = progress_result(&doc, String::new(), aggregate);
    let _ = tx.send(final_result).await;
}

/// Fills the result slots of every not-yet-run plugin from `from` onward
/// with the given interruption status.
fn mark_unfinished(
    doc: &mut DocumentState,
    from: usize,
    status: DocumentStatus,
    clock: &dyn Clock,
) {
    let now = clock.now();
    for invocation in &mut doc.plugins[from..] {
        if invocation.result.is_none() {
            invocation.result = Some(PluginResult {
                plugin_name: invocation.name.clone(),
                status,
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
                response_code: 0,
                output: None,
                start_time: now,
                end_time: now,
                standard_output_truncated: false,
                standard_error_truncated: false,
            });
        }
    }
}

/// Converts a plugin's raw outcome into the persisted result form,
/// applying output caps and timestamps.
fn seal_outcome(
    plugin_name: String,
    outcome: PluginOutcome,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    caps: OutputCaps,
) -> PluginResult {
    let (stdout, stdout_truncated) = truncate_output(outcome.stdout, caps.max_stdout_bytes);
    let (stderr, stderr_truncated) = truncate_output(outcome.stderr, caps.max_stderr_bytes);

    PluginResult {
        plugin_name,
        status: outcome.status,
        stdout,
        stderr,
        exit_code: outcome.exit_code,
        response_code: outcome.response_code,
        output: outcome.output,
        start_time,
        end_time,
        standard_output_truncated: stdout_truncated,
        standard_error_truncated: stderr_truncated,
    }
}

/// Folds plugin results into the document-level aggregate: the worst
/// non-success status wins.
fn aggregate_status(doc: &DocumentState) -> DocumentStatus {
    let mut aggregate = DocumentStatus::Success;
    for invocation in &doc.plugins {
        let Some(result) = &invocation.result else {
            continue;
        };
        let mut status = result.status;
        // TODO(agent-update): the update plugin reports InProgress even once
        // it has finished; treat that as Success here until the plugin is
        // moved out of process and the status is fixed at the source.
        if invocation.name == PLUGIN_NAME_AGENT_UPDATE
            && status == DocumentStatus::InProgress
        {
            status = DocumentStatus::Success;
        }
        aggregate = aggregate.worst(status);
    }
    aggregate
}

/// Builds a [`DocumentResult`] snapshot of all results produced so far.
fn progress_result(
    doc: &DocumentState,
    last_plugin: String,
    status: DocumentStatus,
) -> DocumentResult {
    let plugin_results: HashMap<String, PluginResult> = doc
        .plugins
        .iter()
        .filter_map(|invocation| {
            invocation
                .result
                .clone()
                .map(|result| (invocation.id.clone(), result))
        })
        .collect();

    DocumentResult {
        document_id: doc.document_id.clone(),
        message_id: doc.message_id.clone(),
        last_plugin,
        status,
        plugin_results,
    }
}

async fn save_interim(store: &Arc<dyn InterimStore>, doc: &DocumentState) {
    if let Err(err) = store.save(doc).await {
        warn!(
            document_id = %doc.document_id,
            error = %err,
            "failed to persist interim document state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::document::{DocumentType, PluginInvocation};
    use crate::store::StoreError;
    use crate::BoxFuture;
    use serde_json::json;
    use std::sync::Mutex;

    /// Interim store that keeps saved snapshots in memory.
    #[derive(Default)]
    struct MemoryStore {
        saves: Mutex<Vec<DocumentState>>,
    }

    impl InterimStore for MemoryStore {
        fn save<'a>(&'a self, doc: &'a DocumentState) -> BoxFuture<'a, Result<(), StoreError>> {
            Box::pin(async move {
                self.saves.lock().unwrap().push(doc.clone());
                Ok(())
            })
        }
    }

    /// Plugin returning a fixed status.
    struct FixedPlugin {
        name: String,
        status: DocumentStatus,
    }

    impl FixedPlugin {
        fn new(name: &str, status: DocumentStatus) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                status,
            })
        }
    }

    impl super::super::plugin::Plugin for FixedPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn execute<'a>(
            &'a self,
            _input: &'a [u8],
            _ctx: &'a PluginContext,
            _token: &'a CancelToken,
        ) -> BoxFuture<'a, PluginOutcome> {
            Box::pin(async move {
                PluginOutcome {
                    status: self.status,
                    stdout: format!("{} ran", self.name),
                    stderr: String::new(),
                    exit_code: 0,
                    response_code: 0,
                    output: None,
                }
            })
        }
    }

    fn document(plugins: &[&str]) -> DocumentState {
        DocumentState {
            document_id: "doc-1".to_string(),
            instance_id: "i-test".to_string(),
            message_id: "msg-1".to_string(),
            association_id: None,
            document_type: DocumentType::SendCommand,
            run_count: 0,
            status: DocumentStatus::InProgress,
            plugins: plugins
                .iter()
                .map(|name| PluginInvocation::new(*name, json!({})))
                .collect(),
            cancel_info: None,
        }
    }

    fn executor_with(plugins: Vec<Arc<FixedPlugin>>) -> PluginExecutor {
        let mut registry = PluginRegistry::new();
        for plugin in plugins {
            registry.register(plugin);
        }
        PluginExecutor::new(
            Arc::new(registry),
            OutputCaps::default(),
            Arc::new(SystemClock),
        )
    }

    async fn drain(mut rx: mpsc::Receiver<DocumentResult>) -> Vec<DocumentResult> {
        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results
    }

    #[tokio::test]
    async fn test_plugins_run_in_declared_order() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::Success),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let rx = executor.run(document(&["alpha", "beta"]), CancelToken::new(), store);
        let results = drain(rx).await;

        let plugins: Vec<&str> = results.iter().map(|r| r.last_plugin.as_str()).collect();
        assert_eq!(plugins, vec!["alpha", "beta", ""]);
        assert_eq!(results.last().unwrap().status, DocumentStatus::Success);
    }

    #[tokio::test]
    async fn test_failed_plugin_dominates_aggregate() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::Failed),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let rx = executor.run(document(&["alpha", "beta"]), CancelToken::new(), store);
        let results = drain(rx).await;

        // Both plugins still run; the aggregate reflects the failure.
        assert_eq!(results.len(), 3);
        assert_eq!(results.last().unwrap().status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_reboot_halts_iteration() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::SuccessAndReboot),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let rx = executor.run(document(&["alpha", "beta"]), CancelToken::new(), store);
        let results = drain(rx).await;

        // One incremental result for alpha, then the final aggregate; beta
        // is never invoked.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].last_plugin, "alpha");
        assert_eq!(results[1].last_plugin, "");
        assert_eq!(results[1].status, DocumentStatus::SuccessAndReboot);
        assert!(!results[1].plugin_results.contains_key("beta"));
    }

    #[tokio::test]
    async fn test_cancelled_token_marks_remaining_plugins() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::Success),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let token = CancelToken::new();
        token.cancel();

        let rx = executor.run(document(&["alpha", "beta"]), token, store);
        let results = drain(rx).await;

        assert_eq!(results.len(), 1);
        let final_result = &results[0];
        assert!(final_result.is_final());
        assert_eq!(final_result.status, DocumentStatus::Cancelled);
        assert_eq!(
            final_result.plugin_results["alpha"].status,
            DocumentStatus::Cancelled
        );
        assert_eq!(
            final_result.plugin_results["beta"].status,
            DocumentStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_unregistered_plugin_fails_invocation() {
        let executor = executor_with(vec![]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let rx = executor.run(document(&["ghost"]), CancelToken::new(), store);
        let results = drain(rx).await;

        assert_eq!(results.last().unwrap().status, DocumentStatus::Failed);
        let plugin_result = &results.last().unwrap().plugin_results["ghost"];
        assert!(plugin_result.stderr.contains("not registered"));
    }

    #[tokio::test]
    async fn test_update_plugin_in_progress_normalized_to_success() {
        let executor = executor_with(vec![FixedPlugin::new(
            PLUGIN_NAME_AGENT_UPDATE,
            DocumentStatus::InProgress,
        )]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        let rx = executor.run(
            document(&[PLUGIN_NAME_AGENT_UPDATE]),
            CancelToken::new(),
            store,
        );
        let results = drain(rx).await;

        assert_eq!(results.last().unwrap().status, DocumentStatus::Success);
    }

    #[tokio::test]
    async fn test_resumed_document_skips_completed_plugins() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::Failed),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let store: Arc<dyn InterimStore> = Arc::new(MemoryStore::default());

        // Simulate a document recovered after a reboot requested by alpha.
        let mut doc = document(&["alpha", "beta"]);
        doc.plugins[0].result = Some(PluginResult {
            plugin_name: "alpha".to_string(),
            status: DocumentStatus::SuccessAndReboot,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            response_code: 0,
            output: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            standard_output_truncated: false,
            standard_error_truncated: false,
        });

        let rx = executor.run(doc, CancelToken::new(), store);
        let results = drain(rx).await;

        // alpha (which would now fail) is skipped, beta runs, and alpha's
        // satisfied reboot counts as plain success.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].last_plugin, "beta");
        assert_eq!(results.last().unwrap().status, DocumentStatus::Success);
        assert_eq!(
            results.last().unwrap().plugin_results["alpha"].status,
            DocumentStatus::Success
        );
    }

    #[tokio::test]
    async fn test_interim_state_persisted_after_each_plugin() {
        let executor = executor_with(vec![
            FixedPlugin::new("alpha", DocumentStatus::Success),
            FixedPlugin::new("beta", DocumentStatus::Success),
        ]);
        let memory = Arc::new(MemoryStore::default());
        let store: Arc<dyn InterimStore> = Arc::clone(&memory) as Arc<dyn InterimStore>;

        let rx = executor.run(document(&["alpha", "beta"]), CancelToken::new(), store);
        drain(rx).await;

        // One save per plugin plus the final aggregate save.
        let saves = memory.saves.lock().unwrap();
        assert_eq!(saves.len(), 3);
        assert!(saves[0].plugins[0].result.is_some());
        assert!(saves[0].plugins[1].result.is_none());
        assert_eq!(saves[2].status, DocumentStatus::Success);
    }
}
