//! Cooperative cancellation
//!
//! Cancellation is a cooperative flag: requesting it never interrupts
//! a running transaction, it only resolves the `cancelled()` future at
//! the next suspension point. Shielded regions (lifecycle teardown)
//! simply never await that future.

use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation token
///
/// Cheap to clone; all clones observe the same request. Cancellation
/// is one-way and idempotent.
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Create a token with no cancellation requested
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request cancellation; wakes every waiter
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Non-blocking cancellation check
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The token itself keeps the sender alive, so this only
        // returns Err if every clone is gone, which cannot be observed
        // from inside an await on one of them.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
