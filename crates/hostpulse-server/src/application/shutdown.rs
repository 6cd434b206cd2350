//! Process-wide, one-shot cancellation signal.
//!
//! A [`ShutdownSignal`] is created once in `main` and handed to every task
//! that must stop at shutdown: the HTTP server's graceful-shutdown future and
//! each streaming session.  Clones are cheap handles onto the same state.
//!
//! Once triggered it stays triggered.  There is no reset.

use std::sync::Arc;

use tokio::sync::watch;

/// Broadcast cancellation flag, safe to observe from any number of tasks.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a signal in the not-triggered state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Triggers the signal.
    ///
    /// Returns `true` if this call flipped the state, `false` if the signal
    /// was already triggered.  Calling it again has no further effect.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        })
    }

    /// Non-blocking check of the current state.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal has been triggered.
    ///
    /// Resolves immediately if it already has been.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot fail on a
        // closed channel while we are waiting.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    #[test]
    fn test_new_signal_is_not_triggered() {
        assert!(!ShutdownSignal::new().is_triggered());
    }

    #[test]
    fn test_trigger_is_observed_by_clones() {
        // Arrange
        let signal = ShutdownSignal::new();
        let observer = signal.clone();

        // Act
        signal.trigger();

        // Assert
        assert!(observer.is_triggered());
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(signal.trigger(), "first trigger flips the state");
        assert!(!signal.trigger(), "second trigger is a no-op");
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_cancelled_pends_until_triggered() {
        let signal = ShutdownSignal::new();
        let mut waiter = task::spawn(signal.cancelled());

        assert_pending!(waiter.poll());

        signal.trigger();

        assert!(waiter.is_woken());
        assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_after_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        // Future observers see the permanent cancelled state.
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("already-triggered signal must resolve at once");
    }

    #[tokio::test]
    async fn test_trigger_wakes_many_waiting_tasks() {
        let signal = ShutdownSignal::new();
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let s = signal.clone();
                tokio::spawn(async move { s.cancelled().await })
            })
            .collect();

        tokio::task::yield_now().await;
        signal.trigger();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter must wake")
                .expect("waiter must not panic");
        }
    }
}
