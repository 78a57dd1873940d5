//! Post-result hooks.
//!
//! Some subsystems need to see every result as it is produced; the
//! long-running plugin manager, for example, re-registers its plugin from
//! each result. Rather than hard-coding any plugin name into the engine,
//! the processor invokes a [`ResultHook`] after each result and before
//! forwarding it to the output stream.

use crate::document::DocumentResult;
use std::sync::Arc;

/// Observer invoked with every result a command job produces.
///
/// Hooks run on the job's worker and should be quick; anything heavy
/// belongs on a task the hook spawns itself.
pub trait ResultHook: Send + Sync {
    /// Called once per emitted result, before it reaches the output stream.
    fn on_result(&self, result: &DocumentResult);
}

/// Hook that does nothing; the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullResultHook;

impl ResultHook for NullResultHook {
    fn on_result(&self, _result: &DocumentResult) {}
}

/// Fans each result out to several hooks, in registration order.
pub struct MultiplexResultHook {
    hooks: Vec<Arc<dyn ResultHook>>,
}

impl MultiplexResultHook {
    /// Creates a multiplexer over the given hooks.
    pub fn new(hooks: Vec<Arc<dyn ResultHook>>) -> Self {
        Self { hooks }
    }
}

impl ResultHook for MultiplexResultHook {
    fn on_result(&self, result: &DocumentResult) {
        for hook in &self.hooks {
            hook.on_result(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook(Arc<AtomicUsize>);

    impl ResultHook for CountingHook {
        fn on_result(&self, _result: &DocumentResult) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_result() -> DocumentResult {
        DocumentResult {
            document_id: "doc-1".to_string(),
            message_id: "msg-1".to_string(),
            last_plugin: String::new(),
            status: DocumentStatus::Success,
            plugin_results: HashMap::new(),
        }
    }

    #[test]
    fn test_null_hook_is_a_no_op() {
        NullResultHook.on_result(&sample_result());
    }

    #[test]
    fn test_multiplex_calls_every_hook() {
        let counter = Arc::new(AtomicUsize::new(0));
        let multiplex = MultiplexResultHook::new(vec![
            Arc::new(CountingHook(Arc::clone(&counter))),
            Arc::new(CountingHook(Arc::clone(&counter))),
        ]);

        multiplex.on_result(&sample_result());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
