//! HTTP surface: router, WebSocket upgrade and the WebSocket transport.
//!
//! | Route     | Handler                                              |
//! |-----------|------------------------------------------------------|
//! | `GET /`   | `tower_http::services::ServeFile` over the index page |
//! | `GET /ws` | upgrade, then one [`StreamSession`] per connection    |
//!
//! Every request is logged by `tower_http`'s `TraceLayer`.  Origins are not
//! checked: any page may open the stream.
//!
//! The router must be served with
//! `into_make_service_with_connect_info::<SocketAddr>()` (the
//! [`LifecycleController`](super::lifecycle::LifecycleController) does this)
//! so that sessions can log their peer address.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeFile;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

use crate::application::{
    CloseReason, FrameTransport, MetricSampler, ProbeFactory, SessionEnd, SessionError,
    SessionTracker, ShutdownSignal, StreamSession, TransportError,
};
use crate::domain::ServerConfig;

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the HTTP listener.
///
/// # Errors
///
/// Returns an error if the address cannot be bound (port in use, missing
/// permission).  This is the one failure that aborts startup.
pub async fn bind_listener(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    info!("telemetry server listening on {addr}");
    Ok(listener)
}

/// Builds the router serving the index page and the telemetry stream.
///
/// Each accepted `/ws` connection gets its own probe from `probes`, observes
/// `shutdown` and stays counted in `sessions` until its connection is closed.
pub fn build_router(
    config: &ServerConfig,
    shutdown: ShutdownSignal,
    sessions: SessionTracker,
    probes: ProbeFactory,
) -> Router {
    let state = AppState {
        shutdown,
        sessions,
        probes,
        tick_interval: config.tick_interval,
        cpu_window: config.cpu_window,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/ws", get(ws_handler))
        .route_service("/", ServeFile::new(&config.index_path))
        .layer(trace_layer)
        .with_state(state)
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// Per-router state shared by every `/ws` request.
#[derive(Clone)]
struct AppState {
    shutdown: ShutdownSignal,
    sessions: SessionTracker,
    probes: ProbeFactory,
    tick_interval: Duration,
    cpu_window: Duration,
}

/// Performs the upgrade handshake and hands the socket to a session.
///
/// A request that is not a valid upgrade is logged and answered with the
/// upgrade layer's own rejection; no session is created.
async fn ws_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            warn!("WebSocket upgrade from {peer} rejected: {rejection}");
            return rejection.into_response();
        }
    };

    // The listener may still hold queued connections while draining.
    if state.shutdown.is_triggered() {
        info!("refusing WebSocket upgrade from {peer}: shutting down");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    // Counted from here so a session accepted just before shutdown is
    // still waited for.  A failed upgrade drops the guard with the callback.
    let guard = state.sessions.track();
    upgrade
        .on_failed_upgrade(move |e: axum::Error| {
            warn!("WebSocket upgrade with {peer} failed: {e}");
        })
        .on_upgrade(move |socket| async move {
            run_stream_session(socket, peer, state).await;
            drop(guard);
        })
}

/// Body of the per-connection task spawned by axum after the upgrade.
async fn run_stream_session(socket: WebSocket, peer: SocketAddr, state: AppState) {
    let sampler = MetricSampler::new((state.probes)(), state.cpu_window);
    let session = StreamSession::new(WsTransport::new(socket), sampler, state.tick_interval);
    let id = session.id();
    info!("session {id}: WebSocket established with {peer}");

    let summary = session.run(state.shutdown).await;
    let frames = summary.frames_sent;
    match summary.end {
        SessionEnd::Cancelled => {
            info!("session {id}: stopped by shutdown after {frames} frames");
        }
        SessionEnd::Failed(SessionError::Transport(e)) => {
            info!("session {id}: peer {peer} gone after {frames} frames ({e})");
        }
        SessionEnd::Failed(e) => {
            warn!("session {id}: closed with error after {frames} frames: {e}");
        }
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// [`FrameTransport`] over an upgraded axum WebSocket.
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    /// Wraps an upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl FrameTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.socket
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn close(&mut self, reason: CloseReason) -> Result<(), TransportError> {
        let frame = match reason {
            CloseReason::GoingAway => CloseFrame {
                code: close_code::AWAY,
                reason: "server shutting down".into(),
            },
            CloseReason::Normal => CloseFrame {
                code: close_code::NORMAL,
                reason: "".into(),
            },
        };
        self.socket
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}
