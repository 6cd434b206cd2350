//! OS termination signals.
//!
//! On Unix both SIGINT (Ctrl+C) and SIGTERM (`kill`, systemd, container
//! runtimes) request a graceful shutdown.  Elsewhere only Ctrl+C is
//! available.
//!
//! Handlers are installed up front by [`TerminationSignals::install`] so that
//! a failure to install them aborts startup instead of leaving a server that
//! cannot be stopped cleanly.

use std::fmt;

use anyhow::Context;

/// Which termination request arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for TerminationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationKind::Interrupt => f.write_str("SIGINT"),
            TerminationKind::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installed termination handlers, consumed by [`recv`](Self::recv).
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Installs the handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot register a signal handler.
    #[cfg(unix)]
    pub fn install() -> anyhow::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())
                .context("failed to install SIGINT handler")?,
            terminate: signal(SignalKind::terminate())
                .context("failed to install SIGTERM handler")?,
        })
    }

    /// Installs the handlers.
    ///
    /// # Errors
    ///
    /// Never fails on this platform; Ctrl+C is registered lazily in `recv`.
    #[cfg(not(unix))]
    pub fn install() -> anyhow::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the first termination request.
    #[cfg(unix)]
    pub async fn recv(mut self) -> TerminationKind {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationKind::Interrupt,
            _ = self.terminate.recv() => TerminationKind::Terminate,
        }
    }

    /// Waits for the first termination request.
    #[cfg(not(unix))]
    pub async fn recv(self) -> TerminationKind {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}; shutting down");
        }
        TerminationKind::Interrupt
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
