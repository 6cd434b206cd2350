//! JSON codec for telemetry frames.
//!
//! Wire format, one WebSocket text message per tick:
//! ```text
//! {"ram_usage":<float>,"cpu_usage":<float>,"timestamp":<int>}
//! ```
//! Every field is mandatory.  There is no version field, envelope or
//! compression.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::frame::{TelemetryFrame, MAX_PERCENT, MIN_PERCENT};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame could not be rendered as JSON.
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// The text is not a JSON object of the expected shape (bad syntax, a
    /// missing field, an unknown field, or a field of the wrong type).
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// A percentage field lies outside `[0, 100]`.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Decoding mirror of [`TelemetryFrame`]; validation happens after parsing.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireFrame {
    ram_usage: f64,
    cpu_usage: f64,
    timestamp: i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`TelemetryFrame`] into its JSON text form.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.  With the
/// invariants enforced by [`TelemetryFrame::new`] this does not happen in
/// practice, but the session treats it as fatal if it ever does.
///
/// # Examples
///
/// ```rust
/// use hostpulse_core::{encode_frame, TelemetryFrame};
///
/// let text = encode_frame(&TelemetryFrame::new(50.0, 12.5, 1_700_000_000)).unwrap();
/// assert_eq!(
///     text,
///     r#"{"ram_usage":50.0,"cpu_usage":12.5,"timestamp":1700000000}"#
/// );
/// ```
pub fn encode_frame(frame: &TelemetryFrame) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes one [`TelemetryFrame`] from JSON text.
///
/// Out-of-range percentages are rejected rather than clamped: a frame that
/// violates the invariants did not come from a well-behaved sender.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] for any shape problem and
/// [`ProtocolError::OutOfRange`] for a percentage outside `[0, 100]`.
pub fn decode_frame(text: &str) -> Result<TelemetryFrame, ProtocolError> {
    let wire: WireFrame =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    check_percent("ram_usage", wire.ram_usage)?;
    check_percent("cpu_usage", wire.cpu_usage)?;

    Ok(TelemetryFrame::new(
        wire.ram_usage,
        wire.cpu_usage,
        wire.timestamp,
    ))
}

fn check_percent(field: &'static str, value: f64) -> Result<(), ProtocolError> {
    if (MIN_PERCENT..=MAX_PERCENT).contains(&value) {
        Ok(())
    } else {
        Err(ProtocolError::OutOfRange { field, value })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
