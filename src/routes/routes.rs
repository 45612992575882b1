//! Defines the HTTP surface.
//!
//! ## Structure
//! - `GET  /`: service metadata and limits
//! - `GET  /health`: liveness with uptime
//! - `POST /upload`: multipart upload (`file`, optional `secret`),
//!   rate-limited per client and body-capped at the file ceiling plus
//!   multipart framing headroom

use crate::{
    errors::AppError,
    handlers::{
        health_handlers::{health, info},
        upload_handlers::upload_file,
    },
    middleware::rate_limit::limit_uploads,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Room for multipart boundaries, part headers and the secret field.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the router with `state` attached.
pub fn routes(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload_file)
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn_with_state(state.clone(), limit_uploads)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// A panicking handler still answers with the JSON error shape. The panic
/// payload is not echoed back to the client.
fn panic_response(_payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal("request handler panicked".into()).into_response()
}
