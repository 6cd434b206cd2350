//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! `main.rs` builds it from defaults, an optional TOML file and CLI flags; the
//! rest of the crate only ever sees the finished struct.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default HTTP port, the fixed port of the original single-binary server.
pub const DEFAULT_PORT: u16 = 8080;

/// Streaming cadence: one frame per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Length of the CPU measurement window.
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

/// Upper bound on the graceful HTTP drain at shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A configuration value that cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A duration setting was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The CPU window is longer than the tick, so frames would lag the cadence.
    #[error("cpu_window ({cpu_window:?}) must not exceed tick_interval ({tick_interval:?})")]
    CpuWindowExceedsTick {
        cpu_window: Duration,
        tick_interval: Duration,
    },
}

/// All runtime configuration for the telemetry server.
///
/// # Example
///
/// ```rust
/// use hostpulse_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.  Serves both `/` and `/ws`.
    pub bind_addr: SocketAddr,

    /// HTML file served at `GET /`.
    pub index_path: PathBuf,

    /// Time between consecutive frames of one session.
    pub tick_interval: Duration,

    /// How long each CPU reading averages over.  The reading blocks for this
    /// long, so it must not exceed `tick_interval`.
    pub cpu_window: Duration,

    /// Maximum time to wait for in-flight HTTP work at shutdown before the
    /// server task is abandoned.
    pub drain_timeout: Duration,
}

impl ServerConfig {
    /// Checks the settings that would make the server misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] naming the first zero duration,
    /// or [`ConfigError::CpuWindowExceedsTick`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("tick_interval"));
        }
        if self.cpu_window.is_zero() {
            return Err(ConfigError::ZeroDuration("cpu_window"));
        }
        if self.drain_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("drain_timeout"));
        }
        if self.cpu_window > self.tick_interval {
            return Err(ConfigError::CpuWindowExceedsTick {
                cpu_window: self.cpu_window,
                tick_interval: self.tick_interval,
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    /// | Field           | Default             |
    /// |-----------------|---------------------|
    /// | bind_addr       | `0.0.0.0:8080`      |
    /// | index_path      | `static/index.html` |
    /// | tick_interval   | 1 second            |
    /// | cpu_window      | 1 second            |
    /// | drain_timeout   | 5 seconds           |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            index_path: PathBuf::from("static/index.html"),
            tick_interval: DEFAULT_TICK_INTERVAL,
            cpu_window: DEFAULT_CPU_WINDOW,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port_is_8080() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn test_default_binds_all_interfaces() {
        let cfg = ServerConfig::default();
        assert!(cfg.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn test_default_tick_is_one_second() {
        assert_eq!(ServerConfig::default().tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_default_drain_timeout_is_five_seconds() {
        assert_eq!(ServerConfig::default().drain_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ServerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        // Arrange
        let cfg = ServerConfig {
            tick_interval: Duration::ZERO,
            ..ServerConfig::default()
        };

        // Act / Assert
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration("tick_interval"))
        );
    }

    #[test]
    fn test_zero_cpu_window_is_rejected() {
        let cfg = ServerConfig {
            cpu_window: Duration::ZERO,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDuration("cpu_window")));
    }

    #[test]
    fn test_cpu_window_longer_than_tick_is_rejected() {
        // Arrange
        let cfg = ServerConfig {
            tick_interval: Duration::from_secs(1),
            cpu_window: Duration::from_secs(2),
            ..ServerConfig::default()
        };

        // Act / Assert
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::CpuWindowExceedsTick {
                cpu_window: Duration::from_secs(2),
                tick_interval: Duration::from_secs(1),
            })
        );
    }

    #[test]
    fn test_cpu_window_equal_to_tick_is_accepted() {
        let cfg = ServerConfig {
            tick_interval: Duration::from_secs(2),
            cpu_window: Duration::from_secs(2),
            ..ServerConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_zero_drain_timeout_is_rejected() {
        let cfg = ServerConfig {
            drain_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration("drain_timeout"))
        );
    }
}
