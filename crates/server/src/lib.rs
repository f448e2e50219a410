//! School Portal REST backend.
//!
//! Stateless handlers behind a CORS allow-list: health banner, login
//! placeholder, profile picture upload stub and account creation. The binary
//! in `main.rs` adds configuration, logging and Sentry; [`app`] is the whole
//! HTTP surface so tests can drive it in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::ServerConfig;
pub use state::AppState;

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let cors = middleware::cors_layer(&config.allowed_origins);
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    routes::routes()
        .layer(body_limit)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
