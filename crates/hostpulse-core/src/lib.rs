//! # hostpulse-core
//!
//! Shared library for hostpulse containing the telemetry frame type and the
//! JSON codec that puts it on the wire.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or network
//! sockets.  The server samples the host and pushes frames; a Rust client (or
//! a test harness) can decode the same frames with [`decode_frame`].
//!
//! - **`domain`** – The [`TelemetryFrame`] snapshot and the helpers that keep
//!   its fields inside their valid ranges.
//!
//! - **`protocol`** – How a frame travels as a WebSocket text message:
//!   `{"ram_usage":<float>,"cpu_usage":<float>,"timestamp":<int>}`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hostpulse_core::TelemetryFrame` instead of the full module path.
pub use domain::clock::unix_timestamp_now;
pub use domain::frame::{clamp_percent, TelemetryFrame};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
