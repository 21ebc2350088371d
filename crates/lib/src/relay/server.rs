//! Relay HTTP server: `POST /api/chat` forwards to the NLP backend, `GET /` reports health.

use crate::backend::{BackendError, BackendResponse, NlpClient};
use crate::config::Config;
use crate::relay::protocol::{InboundChatRequest, OutboundReply};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Shared state for the relay, built once at startup from injected config.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    pub backend: NlpClient,
}

impl RelayState {
    pub fn new(config: Config) -> Self {
        let backend = NlpClient::from_config(&config.backend);
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}

/// Build the relay router with permissive CORS (any origin, method, header).
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/api/chat", post(chat_http))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Forward one message to the backend. Exactly one backend call, no retries.
pub async fn relay_chat(
    backend: &NlpClient,
    request: &InboundChatRequest,
) -> Result<OutboundReply, BackendError> {
    let response: BackendResponse = backend.chat(request.message.as_deref()).await?;
    Ok(OutboundReply::from_backend(response))
}

/// Map the relay result to status and body. Failures are logged and collapse to the generic 500 reply.
pub fn reply_status(result: Result<OutboundReply, BackendError>) -> (StatusCode, OutboundReply) {
    match result {
        Ok(reply) => (StatusCode::OK, reply),
        Err(e) => {
            log::error!("error communicating with NLP backend: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, OutboundReply::server_error())
        }
    }
}

/// Run the relay; binds to config.server.bind:config.server.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_relay(config: Config) -> Result<()> {
    let bind = config.server.bind.trim().to_string();
    let port = config.server.port;
    let listener = TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("binding to {} port {}", bind, port))?;
    serve(listener, config).await
}

/// Serve the relay on an already-bound listener until shutdown.
/// `config.server.port` is replaced by the listener's actual port.
pub async fn serve(listener: TcpListener, mut config: Config) -> Result<()> {
    let local_addr = listener.local_addr().context("reading listener address")?;
    config.server.port = local_addr.port();
    let state = RelayState::new(config);
    log::info!(
        "relay listening on {}, forwarding to {}",
        local_addr,
        state.backend.url()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /api/chat — relay `{ message }` to the backend as `{ query_text }` and answer `{ reply }`.
async fn chat_http(State(state): State<RelayState>, body: Bytes) -> (StatusCode, Json<OutboundReply>) {
    let request = match InboundChatRequest::from_body(&body) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("rejecting chat request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(OutboundReply::invalid_request()));
        }
    };
    let request_id = uuid::Uuid::new_v4();
    if request.message.is_none() {
        log::debug!("[{}] chat request has no message; forwarding null", request_id);
    }
    log::debug!("[{}] forwarding chat message to {}", request_id, state.backend.url());

    let (status, reply) = reply_status(relay_chat(&state.backend, &request).await);
    log::debug!("[{}] relay answered {}", request_id, status);
    (status, Json(reply))
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.server.port,
        "backend": state.backend.url(),
    }))
}
