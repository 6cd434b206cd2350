//! Infrastructure layer for hostpulse-server.
//!
//! Concrete adapters behind the application seams, plus process plumbing:
//!
//! - [`sysinfo_probe`]: [`HostProbe`](crate::application::HostProbe) over `sysinfo`.
//! - [`http_server`]: axum router, WebSocket upgrade and transport.
//! - [`lifecycle`]: serve, then drain within a bound.
//! - [`signals`]: SIGINT / SIGTERM.
//! - [`config_file`]: optional TOML configuration.

pub mod config_file;
pub mod http_server;
pub mod lifecycle;
pub mod signals;
pub mod sysinfo_probe;

pub use config_file::{load_config, parse_config, ConfigFileError};
pub use http_server::{bind_listener, build_router, WsTransport};
pub use lifecycle::{DrainOutcome, LifecycleController};
pub use signals::{TerminationKind, TerminationSignals};
pub use sysinfo_probe::SysinfoProbe;
