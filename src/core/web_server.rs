//! Webhook HTTP server.
//!
//! Serves the Telegram webhook plus liveness and Prometheus endpoints on
//! WEB_PORT (default 3000).

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Instant;

use crate::core::metrics;
use crate::telegram::handlers::UpdateProcessor;

/// Shared state for the web server.
#[derive(Clone)]
struct WebState {
    processor: UpdateProcessor,
    start_time: Arc<Instant>,
}

/// Builds the router. Split from [`start_web_server`] so tests can serve it
/// on an ephemeral port.
pub fn create_router(processor: UpdateProcessor) -> Router {
    let state = WebState {
        processor,
        start_time: Arc::new(Instant::now()),
    };

    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Start the webhook server.
pub async fn start_web_server(port: u16, processor: UpdateProcessor) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;

    log::info!("Starting web server on http://{}", addr);
    log::info!("  POST /webhook - Telegram updates");
    log::info!("  GET  /health  - Health check");
    log::info!("  GET  /metrics - Prometheus metrics");

    serve(listener, processor).await
}

/// Serves on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, processor: UpdateProcessor) -> anyhow::Result<()> {
    axum::serve(listener, create_router(processor)).await?;
    Ok(())
}

/// Every update is acknowledged with 200; the body says what happened.
async fn webhook_handler(State(state): State<WebState>, body: Bytes) -> impl IntoResponse {
    let outcome = state.processor.process_raw(&body).await;
    (StatusCode::OK, Json(outcome))
}

async fn health_handler(State(state): State<WebState>) -> impl IntoResponse {
    let health_status = json!({
        "status": "Bot is running!",
        "message": "Telegram marketplace bot is alive",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(health_status))
}

async fn metrics_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        metrics::render(),
    )
        .into_response()
}
