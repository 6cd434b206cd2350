//! Domain layer for hostpulse-server.
//!
//! Plain configuration types with no I/O.  Reading files, parsing CLI
//! arguments and binding sockets all happen in outer layers.

pub mod config;

pub use config::{ConfigError, ServerConfig};
