//! Per-job cancellation token with distinct cancel and shutdown states.
//!
//! A plain boolean flag cannot tell a user-initiated cancel apart from an
//! orderly pool shutdown, and plugins need the distinction (a cancelled
//! command reports `Cancelled`, a shut-down one reports `Shutdown` and is
//! re-run after restart). The token therefore has three observable states,
//! of which two are terminal; the first terminal state set wins and never
//! reverts.

use tokio::sync::watch;

/// Observable state of a [`CancelToken`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenState {
    /// The job may keep running.
    #[default]
    Active,

    /// A user asked for this specific job to stop.
    Cancelled,

    /// The pool is shutting down; the job should stop so it can resume
    /// after restart.
    Shutdown,
}

impl TokenState {
    /// Returns true for the two terminal states.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Cancellation token handed to every job body.
///
/// Cloneable; all clones observe the same state. Job bodies are expected
/// to poll at coarse checkpoints (between plugins, around long I/O) rather
/// than rely on preemption.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: std::sync::Arc<watch::Sender<TokenState>>,
}

impl CancelToken {
    /// Creates a token in the `Active` state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TokenState::Active);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Current state.
    pub fn state(&self) -> TokenState {
        *self.tx.borrow()
    }

    /// True once either terminal state is set.
    pub fn is_set(&self) -> bool {
        self.state().is_set()
    }

    /// True if the job was cancelled by a user.
    pub fn is_cancelled(&self) -> bool {
        self.state() == TokenState::Cancelled
    }

    /// True if the pool is shutting down.
    pub fn is_shutdown(&self) -> bool {
        self.state() == TokenState::Shutdown
    }

    /// Marks the token cancelled. No-op if a terminal state is already set.
    pub fn cancel(&self) {
        self.set(TokenState::Cancelled);
    }

    /// Marks the token shut down. No-op if a terminal state is already set.
    pub fn shutdown(&self) {
        self.set(TokenState::Shutdown);
    }

    /// Waits until a terminal state is set and returns it.
    pub async fn done(&self) -> TokenState {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so wait_for cannot fail.
        let result = match rx.wait_for(|state| state.is_set()).await {
            Ok(state) => *state,
            Err(_) => TokenState::Shutdown,
        };
        result
    }

    fn set(&self, next: TokenState) {
        self.tx.send_modify(|state| {
            if !state.is_set() {
                *state = next;
            }
        });
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_active() {
        let token = CancelToken::new();
        assert_eq!(token.state(), TokenState::Active);
        assert!(!token.is_set());
        assert!(!token.is_cancelled());
        assert!(!token.is_shutdown());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());

        // Shutdown after cancel does not revert or replace.
        token.shutdown();
        assert!(token.is_cancelled());
        assert!(!token.is_shutdown());
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let token = CancelToken::new();
        token.shutdown();
        assert!(token.is_shutdown());

        token.cancel();
        assert!(token.is_shutdown());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_done_wakes_on_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.done().await });

        token.cancel();
        assert_eq!(handle.await.unwrap(), TokenState::Cancelled);
    }

    #[tokio::test]
    async fn test_done_returns_immediately_when_already_set() {
        let token = CancelToken::new();
        token.shutdown();
        assert_eq!(token.done().await, TokenState::Shutdown);
    }
}
