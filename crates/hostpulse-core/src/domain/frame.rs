//! The telemetry snapshot sent to browsers.
//!
//! A [`TelemetryFrame`] is built fresh on every tick, serialized immediately
//! and dropped after the send.  Nothing keeps a history of frames.
//!
//! # Invariants
//!
//! - `ram_usage` and `cpu_usage` are always in `[0.0, 100.0]`.
//! - Neither percentage is ever NaN or infinite.
//!
//! Both are enforced at construction by [`clamp_percent`], so every frame that
//! reaches the codec is already valid.  The fields are private: once built, a
//! frame cannot be changed.

use serde::Serialize;

/// Lowest valid utilization percentage.
pub const MIN_PERCENT: f64 = 0.0;

/// Highest valid utilization percentage.
pub const MAX_PERCENT: f64 = 100.0;

/// Forces a raw utilization reading into `[0.0, 100.0]`.
///
/// Non-finite readings (NaN, ±∞) map to `0.0`, the same value the sampler
/// reports when a reading is unavailable.
///
/// # Examples
///
/// ```rust
/// use hostpulse_core::clamp_percent;
///
/// assert_eq!(clamp_percent(42.5), 42.5);
/// assert_eq!(clamp_percent(100.3), 100.0);
/// assert_eq!(clamp_percent(-0.1), 0.0);
/// assert_eq!(clamp_percent(f64::NAN), 0.0);
/// ```
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_PERCENT, MAX_PERCENT)
    } else {
        MIN_PERCENT
    }
}

/// One host utilization snapshot.
///
/// Serializes to exactly the browser-facing wire shape, in this field order:
///
/// ```json
/// {"ram_usage":63.2,"cpu_usage":7.5,"timestamp":1760745600}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryFrame {
    /// Used memory as a percentage of total memory.
    ram_usage: f64,
    /// Average CPU utilization over the sampling window.
    ///
    /// `0.0` is both a genuine idle reading and the fallback for a failed
    /// measurement; the wire does not tell them apart.
    cpu_usage: f64,
    /// Seconds since the Unix epoch when the frame was built.
    timestamp: i64,
}

impl TelemetryFrame {
    /// Builds a frame, clamping both percentages into `[0.0, 100.0]`.
    pub fn new(ram_usage: f64, cpu_usage: f64, timestamp: i64) -> Self {
        Self {
            ram_usage: clamp_percent(ram_usage),
            cpu_usage: clamp_percent(cpu_usage),
            timestamp,
        }
    }

    /// Used memory percentage.
    pub fn ram_usage(&self) -> f64 {
        self.ram_usage
    }

    /// CPU utilization percentage.
    pub fn cpu_usage(&self) -> f64 {
        self.cpu_usage
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_in_range_values() {
        // Arrange / Act
        let frame = TelemetryFrame::new(63.25, 7.5, 1_760_745_600);

        // Assert
        assert_eq!(frame.ram_usage(), 63.25);
        assert_eq!(frame.cpu_usage(), 7.5);
        assert_eq!(frame.timestamp(), 1_760_745_600);
    }

    #[test]
    fn test_new_clamps_values_above_100() {
        let frame = TelemetryFrame::new(100.0001, 250.0, 0);
        assert_eq!(frame.ram_usage(), 100.0);
        assert_eq!(frame.cpu_usage(), 100.0);
    }

    #[test]
    fn test_new_clamps_negative_values_to_zero() {
        let frame = TelemetryFrame::new(-3.0, -0.5, 0);
        assert_eq!(frame.ram_usage(), 0.0);
        assert_eq!(frame.cpu_usage(), 0.0);
    }

    #[test]
    fn test_new_maps_non_finite_values_to_zero() {
        let frame = TelemetryFrame::new(f64::NAN, f64::INFINITY, 0);
        assert_eq!(frame.ram_usage(), 0.0);
        assert_eq!(frame.cpu_usage(), 0.0);
    }

    #[test]
    fn test_clamp_percent_boundaries_are_inclusive() {
        assert_eq!(clamp_percent(MIN_PERCENT), MIN_PERCENT);
        assert_eq!(clamp_percent(MAX_PERCENT), MAX_PERCENT);
    }

    #[test]
    fn test_clamp_percent_negative_infinity_is_zero() {
        assert_eq!(clamp_percent(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_frame_is_copy() {
        // Sessions hand frames to the codec by value; Copy keeps that free.
        let frame = TelemetryFrame::new(1.0, 2.0, 3);
        let copy = frame;
        assert_eq!(frame, copy);
    }
}
