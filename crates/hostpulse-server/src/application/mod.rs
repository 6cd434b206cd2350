//! Application layer for hostpulse-server.
//!
//! Knows *what* a streaming session does (sample, stamp, encode, send, stop)
//! and delegates *how* to the infrastructure layer through two seams:
//!
//! - [`HostProbe`]: where readings come from (sysinfo in production).
//! - [`FrameTransport`]: where frames go (an axum WebSocket in production).
//!
//! Neither axum nor sysinfo is imported here, so every behaviour in this
//! layer is testable with in-memory fakes.

pub mod sampler;
pub mod session_tracker;
pub mod shutdown;
pub mod stream_session;

pub use sampler::{CpuReading, HostProbe, MetricSampler, ProbeError, ProbeFactory, Sample};
pub use session_tracker::{SessionGuard, SessionTracker};
pub use shutdown::ShutdownSignal;
pub use stream_session::{
    CloseReason, FrameTransport, SessionEnd, SessionError, SessionSummary, StreamSession,
    TransportError,
};
