//! [`HostProbe`] backed by the `sysinfo` crate.
//!
//! `sysinfo` computes CPU usage as the difference between two refreshes, so a
//! measurement is: refresh, sleep for the window, refresh again, read.  The
//! window never goes below `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`, under which
//! the OS counters are too coarse to be meaningful.
//!
//! Portable across Linux, macOS and Windows; `sysinfo` hides the per-OS
//! sources (`/proc/stat`, `host_processor_info`, PDH).

use std::sync::Arc;
use std::time::Duration;

use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::application::sampler::{HostProbe, ProbeError, ProbeFactory};

/// Reads host memory and CPU utilization through `sysinfo`.
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    /// Creates a probe and takes the baseline CPU refresh.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }

    /// A [`ProbeFactory`] that gives each session its own `SysinfoProbe`.
    pub fn factory() -> ProbeFactory {
        Arc::new(|| -> Box<dyn HostProbe> { Box::new(SysinfoProbe::new()) })
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SysinfoProbe {
    fn memory_used_percent(&mut self) -> Result<f64, ProbeError> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(ProbeError::NoMemoryData);
        }
        Ok(self.system.used_memory() as f64 / total as f64 * 100.0)
    }

    fn cpu_usage_percent(&mut self, window: Duration) -> Result<f64, ProbeError> {
        self.system.refresh_cpu_usage();
        std::thread::sleep(window.max(MINIMUM_CPU_UPDATE_INTERVAL));
        self.system.refresh_cpu_usage();

        if self.system.cpus().is_empty() {
            return Err(ProbeError::NoCpuData);
        }
        let usage = f64::from(self.system.global_cpu_usage());
        if !usage.is_finite() {
            return Err(ProbeError::NonFinite { metric: "cpu" });
        }
        Ok(usage)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// These read the real host, so they only assert what holds on any machine
// sysinfo supports.

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_memory_reading_is_a_percentage() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let mut probe = SysinfoProbe::new();

        let used = probe.memory_used_percent().expect("supported host reports memory");

        assert!((0.0..=100.0).contains(&used), "got {used}");
    }

    #[test]
    fn test_cpu_reading_is_a_percentage() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let mut probe = SysinfoProbe::new();

        let usage = probe
            .cpu_usage_percent(MINIMUM_CPU_UPDATE_INTERVAL)
            .expect("supported host reports CPU usage");

        assert!((0.0..=100.0).contains(&usage), "got {usage}");
    }

    #[test]
    fn test_cpu_reading_blocks_for_the_window() {
        let mut probe = SysinfoProbe::new();
        let window = MINIMUM_CPU_UPDATE_INTERVAL + Duration::from_millis(50);

        let started = Instant::now();
        let _ = probe.cpu_usage_percent(window);

        assert!(started.elapsed() >= window);
    }

    #[test]
    fn test_factory_builds_independent_probes() {
        let factory = SysinfoProbe::factory();
        let mut first = factory();
        let mut second = factory();
        // Both are usable on their own; neither borrows shared state.
        let _ = first.memory_used_percent();
        let _ = second.memory_used_percent();
    }
}
