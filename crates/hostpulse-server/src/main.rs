//! hostpulse: live host telemetry over WebSocket.
//!
//! # Usage
//!
//! ```text
//! hostpulse [OPTIONS]
//!
//! Options:
//!   --config <PATH>  TOML config file
//!   --bind   <IP>    Listen address [default: 0.0.0.0]
//!   --port   <PORT>  Listen port [default: 8080]
//!   --index  <PATH>  Page served at `/` [default: static/index.html]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Flag       |
//! |--------------------|------------|
//! | `HOSTPULSE_CONFIG` | `--config` |
//! | `HOSTPULSE_BIND`   | `--bind`   |
//! | `HOSTPULSE_PORT`   | `--port`   |
//! | `HOSTPULSE_INDEX`  | `--index`  |
//!
//! Precedence, lowest first: built-in defaults, config file, environment,
//! command line.
//!
//! The process runs until SIGINT or SIGTERM, then closes every stream with
//! "going away" (1001) and exits once the HTTP drain and the streams have
//! finished, or the drain timeout elapses.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostpulse_server::application::{SessionTracker, ShutdownSignal};
use hostpulse_server::domain::ServerConfig;
use hostpulse_server::infrastructure::{
    bind_listener, build_router, load_config, DrainOutcome, LifecycleController, SysinfoProbe,
    TerminationSignals,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Live host CPU and memory telemetry for browsers.
#[derive(Debug, Parser)]
#[command(
    name = "hostpulse",
    about = "Streams host CPU and memory utilization over WebSocket",
    version
)]
struct Cli {
    /// TOML file with server settings.  Flags below override its values.
    #[arg(long, env = "HOSTPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to listen on.
    ///
    /// `0.0.0.0` accepts connections on every interface; `127.0.0.1` only
    /// from this machine.
    #[arg(long, env = "HOSTPULSE_BIND")]
    bind: Option<IpAddr>,

    /// TCP port serving both the page and the `/ws` stream.
    #[arg(long, env = "HOSTPULSE_PORT")]
    port: Option<u16>,

    /// HTML page served at `/`.
    #[arg(long, env = "HOSTPULSE_INDEX")]
    index: Option<PathBuf>,
}

impl Cli {
    /// Resolves the final [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the merged
    /// settings fail validation.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(ip) = self.bind {
            config.bind_addr.set_ip(ip);
        }
        if let Some(port) = self.port {
            config.bind_addr.set_port(port);
        }
        if let Some(index) = self.index {
            config.index_path = index;
        }

        config.validate().context("invalid server configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    info!(
        "hostpulse starting: bind={}, index={}, tick={:?}",
        config.bind_addr,
        config.index_path.display(),
        config.tick_interval
    );

    // Install handlers before binding so a signal during startup is not lost.
    let signals = TerminationSignals::install()?;
    let listener = bind_listener(config.bind_addr).await?;

    let shutdown = ShutdownSignal::new();
    let sessions = SessionTracker::new();
    let router = build_router(
        &config,
        shutdown.clone(),
        sessions.clone(),
        SysinfoProbe::factory(),
    );
    let controller =
        LifecycleController::new(listener, shutdown, sessions, config.drain_timeout);

    let outcome = controller
        .run(router, async move {
            let kind = signals.recv().await;
            info!("received {kind}; initiating graceful shutdown");
        })
        .await?;

    match outcome {
        DrainOutcome::Completed => info!("hostpulse stopped"),
        DrainOutcome::Forced => info!("hostpulse stopped (drain timed out)"),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// `Cli` values are built literally so that HOSTPULSE_* variables in the
// developer's environment cannot leak into the assertions.  Parser tests
// only check fields given explicitly on the command line, which take
// precedence over the environment.
