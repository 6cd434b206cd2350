//! Count of live streaming sessions.
//!
//! Every accepted upgrade holds a [`SessionGuard`] until its session has
//! closed the connection.  At shutdown the lifecycle waits on
//! [`SessionTracker::wait_idle`] so the process does not exit before the
//! sessions have sent their close frames.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared counter of sessions that have not finished yet.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    active: Arc<watch::Sender<usize>>,
}

/// Keeps one session counted until dropped.
#[derive(Debug)]
pub struct SessionGuard {
    active: Arc<watch::Sender<usize>>,
}

impl SessionTracker {
    /// Creates a tracker with no sessions.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    /// Counts a new session.  The count drops again when the guard does.
    pub fn track(&self) -> SessionGuard {
        self.active.send_modify(|n| *n += 1);
        SessionGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of sessions currently counted.
    pub fn active(&self) -> usize {
        *self.active.borrow()
    }

    /// Resolves once no session is counted.
    pub async fn wait_idle(&self) {
        let mut rx = self.active.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.send_modify(|n| *n = n.saturating_sub(1));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
