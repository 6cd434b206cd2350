//! hostpulse-server library crate.
//!
//! Streams the host's memory and CPU utilization to any number of browsers,
//! one JSON frame per second per connection, and serves a small page that
//! renders the stream.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         ↑
//! [hostpulse-server]
//!   ├── domain/             ServerConfig
//!   ├── application/        MetricSampler, StreamSession, ShutdownSignal,
//!   │                       SessionTracker
//!   └── infrastructure/
//!         ├── sysinfo_probe/  Host readings (sysinfo)
//!         ├── http_server/    `/` and `/ws` (axum)
//!         ├── lifecycle/      Serve, then bounded drain
//!         ├── signals/        SIGINT / SIGTERM
//!         └── config_file/    Optional TOML settings
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `hostpulse-core` only; it reaches
//!   the host and the network through the `HostProbe` and `FrameTransport`
//!   traits.
//! - `infrastructure` depends on all other layers plus `tokio`, `axum` and
//!   `sysinfo`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: sampling, per-connection streaming and cancellation.
pub mod application;

/// Infrastructure layer: HTTP server, host probe, signals and config file.
pub mod infrastructure;
