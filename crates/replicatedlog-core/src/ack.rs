//! A one-shot, multi-waiter completion signal for a single replication ACK.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

struct Inner {
    done: AtomicBool,
    notify: Notify,
}

/// Thread-safe future for a single secondary's ACK of a single message.
///
/// Created when a message is enqueued onto a [`crate::backoff`]-driven
/// retry loop, it is set exactly once, on a successful delivery — it is
/// never set to a negative outcome. Failed attempts simply leave it unset
/// and retry. Any number of callers may clone and await the same future;
/// it is safe to drop all clones once the owning request completes.
#[derive(Clone)]
pub struct AckFuture {
    inner: Arc<Inner>,
}

impl AckFuture {
    /// Creates a new, unset ack future.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                done: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Marks this future as successfully acknowledged, waking all waiters.
    ///
    /// Idempotent: calling this more than once has no further effect.
    pub fn set_success(&self) {
        if !self.inner.done.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns true once [`AckFuture::set_success`] has been called.
    pub fn is_done(&self) -> bool {
        self.inner.done.load(Ordering::Acquire)
    }

    /// Waits until the ack is set, or forever if never set.
    pub async fn wait(&self) {
        loop {
            if self.is_done() {
                return;
            }
            let notified = self.inner.notify.notified();
            if self.is_done() {
                return;
            }
            notified.await;
        }
    }

    /// Waits until the ack is set or `timeout` elapses, returning whether
    /// it was set.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

impl Default for AckFuture {
    fn default() -> Self {
        Self::new()
    }
}
