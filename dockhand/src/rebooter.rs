//! Pending-reboot latch.
//!
//! When a plugin completes with [`SuccessAndReboot`], the command job
//! records the request here and leaves its document in the *current*
//! location. The surrounding agent supervisor observes the latch and
//! schedules the actual host reboot; after the reboot, recovery re-enqueues
//! the document.
//!
//! [`SuccessAndReboot`]: crate::document::DocumentStatus::SuccessAndReboot

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Collaborator through which jobs request a host reboot.
pub trait Rebooter: Send + Sync {
    /// Records that a reboot is wanted. Idempotent.
    fn request_pending_reboot(&self);

    /// Returns true if a reboot has been requested.
    fn reboot_requested(&self) -> bool;
}

/// Process-local reboot latch.
///
/// Once set the latch never clears; the process is expected to go away
/// when the supervisor acts on it.
#[derive(Debug, Default)]
pub struct RebootLatch {
    requested: AtomicBool,
}

impl RebootLatch {
    /// Creates an unset latch.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rebooter for RebootLatch {
    fn request_pending_reboot(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            info!("pending reboot requested");
        }
    }

    fn reboot_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
