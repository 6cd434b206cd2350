//! Per-connection sample → serialize → send loop.
//!
//! A [`StreamSession`] owns exactly one upgraded connection (behind the
//! [`FrameTransport`] trait) and one [`MetricSampler`].  It pushes one
//! [`TelemetryFrame`](hostpulse_core::TelemetryFrame) per tick until one of:
//!
//! 1. the [`ShutdownSignal`] is observed (checked before every sample and
//!    while waiting for the next tick),
//! 2. a send fails (the peer left or the network broke; no retry),
//! 3. a frame cannot be encoded, or the sampler task panics.
//!
//! A failed *reading* is not on that list: the sampler reports `0` and the
//! loop carries on.
//!
//! Whatever the exit reason, the connection is closed before
//! [`StreamSession::run`] returns.
//!
//! There is no backpressure handling.  A slow peer stalls its own session and
//! nothing else.

use std::time::Duration;

use async_trait::async_trait;
use hostpulse_core::{encode_frame, unix_timestamp_now, ProtocolError};
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::sampler::{MetricSampler, Sample};
use crate::application::shutdown::ShutdownSignal;

// ── Transport seam ────────────────────────────────────────────────────────────

/// A send or close on the underlying connection failed.
#[derive(Debug, Error, PartialEq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Why the server is closing the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The server is shutting down (WebSocket close code 1001).
    GoingAway,
    /// Any other exit (WebSocket close code 1000).
    Normal,
}

/// One bidirectional message connection, written to by a single session.
#[async_trait]
pub trait FrameTransport: Send {
    /// Sends `text` as a single text message.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Closes the connection.  Called exactly once, as the session ends.
    async fn close(&mut self, reason: CloseReason) -> Result<(), TransportError>;
}

// ── Session outcome ───────────────────────────────────────────────────────────

/// A failure that ends a session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Transport(#[from] TransportError),

    /// A frame could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[from] ProtocolError),

    /// The blocking sampler task panicked or was cancelled.
    #[error("sampler task failed: {0}")]
    Sampler(String),
}

/// How a session reached its terminal state.
#[derive(Debug, PartialEq)]
pub enum SessionEnd {
    /// The shutdown signal was observed.
    Cancelled,
    /// The loop stopped on an error.
    Failed(SessionError),
}

/// What [`StreamSession::run`] reports once the connection is closed.
#[derive(Debug)]
pub struct SessionSummary {
    /// Identifier used in this session's log lines.
    pub session_id: Uuid,
    /// Exit reason.
    pub end: SessionEnd,
    /// Number of frames successfully sent.
    pub frames_sent: u64,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Streams telemetry frames over one connection until stopped.
pub struct StreamSession<T: FrameTransport> {
    id: Uuid,
    transport: T,
    sampler: MetricSampler,
    tick_interval: Duration,
}

impl<T: FrameTransport> StreamSession<T> {
    /// Creates a session in the RUNNING state.  Nothing is sent until
    /// [`run`](Self::run) is awaited.
    pub fn new(transport: T, sampler: MetricSampler, tick_interval: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
            sampler,
            tick_interval,
        }
    }

    /// This session's identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Runs the streaming loop to completion, then closes the connection.
    ///
    /// Never returns an error: every exit path is reported in the summary.
    pub async fn run(self, shutdown: ShutdownSignal) -> SessionSummary {
        let Self {
            id,
            mut transport,
            sampler,
            tick_interval,
        } = self;

        info!("session {id}: streaming every {tick_interval:?}");

        let mut frames_sent = 0;
        let end = stream_frames(
            id,
            &mut transport,
            sampler,
            tick_interval,
            &shutdown,
            &mut frames_sent,
        )
        .await;

        let reason = match end {
            SessionEnd::Cancelled => CloseReason::GoingAway,
            SessionEnd::Failed(_) => CloseReason::Normal,
        };
        if let Err(e) = transport.close(reason).await {
            debug!("session {id}: close failed (peer already gone?): {e}");
        }

        SessionSummary {
            session_id: id,
            end,
            frames_sent,
        }
    }
}

/// The RUNNING state.  Returns the terminal [`SessionEnd`].
async fn stream_frames<T: FrameTransport>(
    id: Uuid,
    transport: &mut T,
    mut sampler: MetricSampler,
    tick_interval: Duration,
    shutdown: &ShutdownSignal,
    frames_sent: &mut u64,
) -> SessionEnd {
    let mut ticker = interval(tick_interval);
    // A sample that overruns the tick delays the schedule instead of
    // producing a burst of catch-up frames.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // The first tick resolves immediately.

    let mut last_timestamp = i64::MIN;

    loop {
        if shutdown.is_triggered() {
            return SessionEnd::Cancelled;
        }

        // The CPU reading blocks for its whole window, so it runs on the
        // blocking pool.  The sampler travels there and back by value.
        let (returned, sample): (MetricSampler, Sample) =
            match tokio::task::spawn_blocking(move || {
                let sample = sampler.sample();
                (sampler, sample)
            })
            .await
            {
                Ok(pair) => pair,
                Err(e) => return SessionEnd::Failed(SessionError::Sampler(e.to_string())),
            };
        sampler = returned;

        // Clamp against a wall clock that stepped backwards.
        let timestamp = unix_timestamp_now().max(last_timestamp);
        last_timestamp = timestamp;

        let text = match encode_frame(&sample.into_frame(timestamp)) {
            Ok(text) => text,
            Err(e) => return SessionEnd::Failed(e.into()),
        };

        if let Err(e) = transport.send_text(text).await {
            return SessionEnd::Failed(e.into());
        }
        *frames_sent += 1;
        debug!(
            "session {id}: frame {frames_sent} sent (ram={:.1}%, cpu={:.1}%)",
            sample.ram_usage,
            sample.cpu_usage()
        );

        tokio::select! {
            _ = ticker.tick() => {}
            () = shutdown.cancelled() => return SessionEnd::Cancelled,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
