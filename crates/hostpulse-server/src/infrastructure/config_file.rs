//! TOML configuration file.
//!
//! Every key is optional; a missing key keeps the built-in default from
//! [`ServerConfig::default`].  Durations are whole seconds.
//!
//! ```toml
//! bind_addr = "127.0.0.1:8080"
//! index_path = "/usr/share/hostpulse/index.html"
//! tick_interval_secs = 1
//! cpu_window_secs = 1
//! drain_timeout_secs = 5
//! ```
//!
//! Unknown keys are rejected so that a typo does not silently fall back to a
//! default.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ConfigError, ServerConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but are not usable.
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// On-disk schema.  `None` means "keep the default".
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind_addr: Option<SocketAddr>,
    index_path: Option<PathBuf>,
    tick_interval_secs: Option<u64>,
    cpu_window_secs: Option<u64>,
    drain_timeout_secs: Option<u64>,
}

impl ConfigFile {
    fn apply_to(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }
        if let Some(path) = self.index_path {
            config.index_path = path;
        }
        if let Some(secs) = self.tick_interval_secs {
            config.tick_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.cpu_window_secs {
            config.cpu_window = Duration::from_secs(secs);
        }
        if let Some(secs) = self.drain_timeout_secs {
            config.drain_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Parses TOML text on top of the defaults and validates the result.
///
/// # Errors
///
/// Returns [`ConfigFileError::Parse`] for bad TOML or unknown keys, and
/// [`ConfigFileError::Invalid`] if validation fails.
pub fn parse_config(text: &str) -> Result<ServerConfig, ConfigFileError> {
    let file: ConfigFile = toml::from_str(text)?;
    let config = file.apply_to(ServerConfig::default());
    config.validate()?;
    Ok(config)
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigFileError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_config`].
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_all_keys_override_defaults() {
        // Arrange
        let text = r#"
            bind_addr = "127.0.0.1:9100"
            index_path = "/srv/pulse/index.html"
            tick_interval_secs = 2
            cpu_window_secs = 2
            drain_timeout_secs = 10
        "#;

        // Act
        let cfg = parse_config(text).unwrap();

        // Assert
        assert_eq!(cfg.bind_addr, "127.0.0.1:9100".parse().unwrap());
        assert_eq!(cfg.index_path, PathBuf::from("/srv/pulse/index.html"));
        assert_eq!(cfg.tick_interval, Duration::from_secs(2));
        assert_eq!(cfg.cpu_window, Duration::from_secs(2));
        assert_eq!(cfg.drain_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg = parse_config("drain_timeout_secs = 8").unwrap();
        assert_eq!(cfg.drain_timeout, Duration::from_secs(8));
        assert_eq!(cfg.bind_addr, ServerConfig::default().bind_addr);
        assert_eq!(cfg.tick_interval, ServerConfig::default().tick_interval);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = parse_config("port = 8080");
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let result = parse_config(r#"bind_addr = "not-an-address""#);
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_zero_tick_is_invalid() {
        let result = parse_config("tick_interval_secs = 0");
        assert!(matches!(
            result,
            Err(ConfigFileError::Invalid(ConfigError::ZeroDuration(
                "tick_interval"
            )))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/hostpulse.toml");

        let err = load_config(path).unwrap_err();

        assert!(matches!(err, ConfigFileError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here/hostpulse.toml"));
    }
}
