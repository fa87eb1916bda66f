// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quizcast_core::QuizcastError;

use crate::GatewayState;
use crate::handlers;

/// Gateway server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the gateway router.
///
/// `GET` routes also answer `HEAD` (axum strips the body), which covers the
/// `HEAD /` liveness probe.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/broadcast", post(handlers::post_broadcast))
        .route("/reset_questions", post(handlers::post_reset_questions))
        .route("/users", get(handlers::get_users))
        .route("/active_users", get(handlers::get_active_users))
        .route("/ping", get(handlers::get_ping))
        .route("/set_webhook", get(handlers::get_set_webhook))
        .route("/", get(handlers::get_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds and serves the gateway until the process shuts down.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), QuizcastError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QuizcastError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| QuizcastError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
