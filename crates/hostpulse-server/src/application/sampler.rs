//! Host metric sampling with a never-fail policy.
//!
//! [`MetricSampler`] turns raw [`HostProbe`] readings into a [`Sample`].  A
//! probe may fail (no CPU data yet, a zero memory total, a bogus value); the
//! sampler logs the fault and substitutes `0.0` so that the streaming loop
//! never stops because of a transient metrics problem.
//!
//! # Blocking
//!
//! [`MetricSampler::sample`] blocks the calling thread for the CPU window
//! (1 second by default).  Async callers must run it on the blocking pool; see
//! `StreamSession`.

use std::sync::Arc;
use std::time::Duration;

use hostpulse_core::{clamp_percent, TelemetryFrame};
use thiserror::Error;
use tracing::warn;

/// A failed host reading.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    /// The host reported no CPUs to measure.
    #[error("no CPU data available")]
    NoCpuData,

    /// The host reported zero total memory.
    #[error("no memory data available")]
    NoMemoryData,

    /// The reading came back as NaN or infinity.
    #[error("non-finite {metric} reading")]
    NonFinite { metric: &'static str },
}

/// OS-facing source of raw utilization readings.
///
/// Implemented by `infrastructure::sysinfo_probe::SysinfoProbe` in production
/// and by fakes in tests.
#[cfg_attr(test, mockall::automock)]
pub trait HostProbe: Send {
    /// Instantaneous used-memory percentage.  Must not block meaningfully.
    fn memory_used_percent(&mut self) -> Result<f64, ProbeError>;

    /// Average CPU utilization across all cores over `window`.  Blocks the
    /// calling thread for roughly `window`.
    fn cpu_usage_percent(&mut self, window: Duration) -> Result<f64, ProbeError>;
}

/// Builds one probe per session so sessions never share sampling state.
pub type ProbeFactory = Arc<dyn Fn() -> Box<dyn HostProbe> + Send + Sync>;

/// Outcome of one CPU measurement.
///
/// The wire cannot tell an idle CPU from a failed reading (both are `0.0`);
/// this type keeps the distinction for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuReading {
    /// A real measurement, already clamped to `[0, 100]`.
    Measured(f64),
    /// The measurement failed and the fallback value is used.
    Unavailable,
}

impl CpuReading {
    /// The percentage reported on the wire.
    pub fn percent(&self) -> f64 {
        match self {
            CpuReading::Measured(value) => *value,
            CpuReading::Unavailable => 0.0,
        }
    }
}

/// One pair of readings taken by [`MetricSampler::sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Used memory percentage, in `[0, 100]`.
    pub ram_usage: f64,
    /// CPU measurement outcome.
    pub cpu: CpuReading,
}

impl Sample {
    /// CPU percentage as sent on the wire (`0.0` for a failed reading).
    pub fn cpu_usage(&self) -> f64 {
        self.cpu.percent()
    }

    /// Stamps the sample into an immutable frame.
    pub fn into_frame(self, timestamp: i64) -> TelemetryFrame {
        TelemetryFrame::new(self.ram_usage, self.cpu_usage(), timestamp)
    }
}

/// Reads RAM and CPU utilization from a [`HostProbe`].
pub struct MetricSampler {
    probe: Box<dyn HostProbe>,
    cpu_window: Duration,
}

impl MetricSampler {
    /// Creates a sampler that averages CPU usage over `cpu_window`.
    pub fn new(probe: Box<dyn HostProbe>, cpu_window: Duration) -> Self {
        Self { probe, cpu_window }
    }

    /// Takes one RAM snapshot and one CPU measurement.
    ///
    /// Never fails: a faulty reading is logged and replaced by `0.0`.
    pub fn sample(&mut self) -> Sample {
        let ram_usage = match self.probe.memory_used_percent() {
            Ok(value) => clamp_percent(value),
            Err(e) => {
                warn!("memory monitoring error: {e}; reporting 0");
                0.0
            }
        };

        let cpu = match self.probe.cpu_usage_percent(self.cpu_window) {
            Ok(value) if value.is_finite() => CpuReading::Measured(clamp_percent(value)),
            Ok(_) => {
                warn!("CPU monitoring error: non-finite reading; reporting 0");
                CpuReading::Unavailable
            }
            Err(e) => {
                warn!("CPU monitoring error: {e}; reporting 0");
                CpuReading::Unavailable
            }
        };

        Sample { ram_usage, cpu }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;

    fn sampler_with(mock: MockHostProbe) -> MetricSampler {
        MetricSampler::new(Box::new(mock), Duration::from_millis(250))
    }

    #[test]
    fn test_sample_passes_through_valid_readings() {
        // Arrange
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent().returning(|| Ok(41.5));
        mock.expect_cpu_usage_percent().returning(|_| Ok(12.25));

        // Act
        let sample = sampler_with(mock).sample();

        // Assert
        assert_eq!(sample.ram_usage, 41.5);
        assert_eq!(sample.cpu, CpuReading::Measured(12.25));
    }

    #[test]
    fn test_sample_uses_configured_cpu_window() {
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent().returning(|| Ok(1.0));
        mock.expect_cpu_usage_percent()
            .with(eq(Duration::from_millis(250)))
            .times(1)
            .returning(|_| Ok(1.0));

        sampler_with(mock).sample();
    }

    #[test]
    fn test_cpu_failure_falls_back_to_zero() {
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent().returning(|| Ok(50.0));
        mock.expect_cpu_usage_percent()
            .returning(|_| Err(ProbeError::NoCpuData));

        let sample = sampler_with(mock).sample();

        assert_eq!(sample.cpu, CpuReading::Unavailable);
        assert_eq!(sample.cpu_usage(), 0.0);
        // RAM is unaffected by the CPU fault.
        assert_eq!(sample.ram_usage, 50.0);
    }

    #[test]
    fn test_non_finite_cpu_reading_is_unavailable() {
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent().returning(|| Ok(50.0));
        mock.expect_cpu_usage_percent().returning(|_| Ok(f64::NAN));

        let sample = sampler_with(mock).sample();

        assert_eq!(sample.cpu, CpuReading::Unavailable);
    }

    #[test]
    fn test_memory_failure_falls_back_to_zero() {
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent()
            .returning(|| Err(ProbeError::NoMemoryData));
        mock.expect_cpu_usage_percent().returning(|_| Ok(30.0));

        let sample = sampler_with(mock).sample();

        assert_eq!(sample.ram_usage, 0.0);
        assert_eq!(sample.cpu, CpuReading::Measured(30.0));
    }

    #[test]
    fn test_out_of_range_readings_are_clamped() {
        let mut mock = MockHostProbe::new();
        mock.expect_memory_used_percent().returning(|| Ok(100.4));
        mock.expect_cpu_usage_percent().returning(|_| Ok(-0.2));

        let sample = sampler_with(mock).sample();

        assert_eq!(sample.ram_usage, 100.0);
        assert_eq!(sample.cpu, CpuReading::Measured(0.0));
    }

    #[test]
    fn test_idle_cpu_and_failed_cpu_look_the_same_on_the_wire() {
        let idle = Sample {
            ram_usage: 10.0,
            cpu: CpuReading::Measured(0.0),
        };
        let failed = Sample {
            ram_usage: 10.0,
            cpu: CpuReading::Unavailable,
        };

        assert_ne!(idle, failed);
        assert_eq!(idle.into_frame(7), failed.into_frame(7));
    }

    #[test]
    fn test_into_frame_carries_timestamp() {
        let sample = Sample {
            ram_usage: 20.0,
            cpu: CpuReading::Measured(5.0),
        };
        let frame = sample.into_frame(1_760_745_600);
        assert_eq!(frame.timestamp(), 1_760_745_600);
        assert_eq!(frame.ram_usage(), 20.0);
        assert_eq!(frame.cpu_usage(), 5.0);
    }
}
