//! Domain entities for hostpulse.
//!
//! Pure value types with no I/O.  Everything here can be constructed and
//! tested without a host to sample or a socket to write to.

/// Wall-clock helper used to stamp frames.
pub mod clock;

/// The telemetry snapshot pushed to browsers once per tick.
///
/// See [`frame::TelemetryFrame`] for the main type.
pub mod frame;
