use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use crate::api::handlers::{health, mcp};
use crate::mcp::McpServer;

pub const MCP_PATH: &str = "/mcp";

pub type AppState = Arc<McpServer>;

pub fn create_router(server: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(MCP_PATH, post(mcp::rpc_handler).get(mcp::rpc_get))
        .with_state(server)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request| {
                            tracing::span!(
                                Level::INFO,
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                            )
                        })
                        .on_request(|_request: &Request, _span: &tracing::Span| {
                            tracing::event!(Level::DEBUG, "received request");
                        })
                        .on_response(
                            |_response: &axum::response::Response,
                             latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(Level::INFO, latency = ?latency, "request completed");
                            },
                        )
                        .on_failure(
                            |_error: tower_http::classify::ServerErrorsFailureClass,
                             _latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(Level::ERROR, "request failed");
                            },
                        ),
                )
                .layer(CorsLayer::permissive()),
        )
}
