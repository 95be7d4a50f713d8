//! Cooperative cancellation
//!
//! A shared flag checked at the two run checkpoints (top of a cycle,
//! between collars mid-cycle) plus an async waiter used to cut the
//! inter-cycle sleep short. The Ctrl-C handler in `main` is the only
//! producer.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// One-shot cancellation flag shared between the signal listener and
/// the run loop
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag and wake every waiter. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.notify.notified();
            // The flag may have been set between the check and the
            // waiter registration
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
