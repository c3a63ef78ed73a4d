//! Axum-based HTTP boundary in front of the prediction core.
//!
//! The gateway owns request parsing, locale rejection, body limits, and
//! timeouts; the dialogue core never sees a malformed or mis-localed
//! request. Wire formats here are deliberately minimal: tokens in, ranked
//! candidate token streams out.

mod handlers;

use handlers::{handle_answer, handle_learn, handle_query, handle_tokenize};

use crate::config::Config;
use crate::predictor::Predictor;
use crate::program::ProgramCodec;
use anyhow::Result;
use axum::{Router, routing::post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB).
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout; also bounds the awaited predictor call.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Shared state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub codec: Arc<dyn ProgramCodec>,
    pub locale: String,
    pub max_candidates: usize,
}

/// Builds the router. Split from [`run_gateway`] so tests can drive handlers
/// without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(handle_query))
        .route("/answer", post(handle_answer))
        .route("/tokenize", post(handle_tokenize))
        .route("/learn", post(handle_learn))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(state)
}

/// Binds and serves the gateway until the process is stopped.
pub async fn run_gateway(
    config: &Config,
    predictor: Arc<dyn Predictor>,
    codec: Arc<dyn ProgramCodec>,
) -> Result<()> {
    let state = AppState {
        predictor,
        codec,
        locale: config.locale.clone(),
        max_candidates: config.predictor.max_candidates,
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, locale = %state.locale, "gateway listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
