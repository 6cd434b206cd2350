//! Server lifecycle: serve until told to stop, then drain within a bound.
//!
//! The [`LifecycleController`] owns the listening socket, the process-wide
//! [`ShutdownSignal`] and the [`SessionTracker`].  When the termination
//! future resolves it:
//!
//! 1. triggers the signal, which both tells axum to stop accepting and drain
//!    in-flight HTTP work, and tells every streaming session to stop at its
//!    next check;
//! 2. waits for the HTTP drain, aborting the server task if it is still busy
//!    at the deadline;
//! 3. waits for the streaming sessions to send their close frames, within
//!    the same deadline;
//! 4. reports whether everything finished in time or was forced.
//!
//! One `drain_timeout` budget covers steps 2 and 3 together.  Upgraded
//! WebSocket connections are not in-flight HTTP work to axum, which is why
//! they are waited for separately.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::application::{SessionTracker, ShutdownSignal};

/// How the bounded drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// In-flight HTTP work and every session finished within the timeout.
    Completed,
    /// The timeout elapsed; remaining work or sessions were abandoned.
    Forced,
}

/// Owns the listener, the shutdown signal and the session count for one
/// server run.
pub struct LifecycleController {
    listener: TcpListener,
    shutdown: ShutdownSignal,
    sessions: SessionTracker,
    drain_timeout: Duration,
}

impl LifecycleController {
    /// Takes ownership of a bound listener.
    ///
    /// `shutdown` and `sessions` must be the ones handed to the router, so
    /// that triggering the signal reaches every session and the wait below
    /// sees them all.
    pub fn new(
        listener: TcpListener,
        shutdown: ShutdownSignal,
        sessions: SessionTracker,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            listener,
            shutdown,
            sessions,
            drain_timeout,
        }
    }

    /// Address the listener is bound to (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves `router` until `termination` resolves, then shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server stops on its own before any
    /// termination request.  A forced drain is not an error.
    pub async fn run<F>(self, router: Router, termination: F) -> anyhow::Result<DrainOutcome>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            listener,
            shutdown,
            sessions,
            drain_timeout,
        } = self;

        let graceful = shutdown.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { graceful.cancelled().await })
            .await
        });

        tokio::select! {
            () = termination => {}
            joined = &mut server => {
                // Sessions must not outlive a dead server.
                shutdown.trigger();
                return match joined {
                    Ok(Ok(())) => Err(anyhow!("HTTP server stopped unexpectedly")),
                    Ok(Err(e)) => Err(e).context("HTTP server failed"),
                    Err(e) => Err(e).context("HTTP server task failed"),
                };
            }
        }

        info!("shutdown requested; draining for up to {drain_timeout:?}");
        shutdown.trigger();
        let deadline = Instant::now() + drain_timeout;

        let http_drained = match timeout_at(deadline, &mut server).await {
            Ok(Ok(Ok(()))) => {
                info!("HTTP drain completed");
                true
            }
            Ok(Ok(Err(e))) => {
                warn!("HTTP server reported an error while draining: {e}");
                true
            }
            Ok(Err(e)) => {
                warn!("HTTP server task failed while draining: {e}");
                true
            }
            Err(_) => {
                server.abort();
                warn!("HTTP drain did not finish within {drain_timeout:?}; forcing shutdown");
                false
            }
        };

        let open = sessions.active();
        if open > 0 {
            info!("waiting for {open} streaming session(s) to close");
        }
        let sessions_closed = match timeout_at(deadline, sessions.wait_idle()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "{} streaming session(s) still open after {drain_timeout:?}; abandoning them",
                    sessions.active()
                );
                false
            }
        };

        if http_drained && sessions_closed {
            Ok(DrainOutcome::Completed)
        } else {
            Ok(DrainOutcome::Forced)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
