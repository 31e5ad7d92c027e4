//! Axum router construction.
//!
//! There are no per-path routes: every request goes through the logging
//! and session middleware and then to [`handlers::dispatch`], which owns
//! the route table.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::session;
use crate::state::AppState;
use crate::telemetry;

/// Build the complete Axum router.
///
/// Layers, outermost first: HTTP trace spans, the request log line, and
/// session resolution.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .layer(middleware::from_fn(session::resolve_session))
        .layer(middleware::from_fn(telemetry::log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
