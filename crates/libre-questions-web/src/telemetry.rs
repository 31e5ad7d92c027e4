//! Logging setup and per-request log lines.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing_subscriber::EnvFilter;

/// Header set by the partial-update client on its requests.
pub const HX_REQUEST_HEADER: &str = "hx-request";

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Call once, from `main`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

/// Whether the request came from the partial-update client.
pub fn is_hx_request(request: &Request) -> bool {
    request
        .headers()
        .get(HX_REQUEST_HEADER)
        .is_some_and(|value| !value.is_empty())
}

/// Middleware logging path, HX flag, status, and duration of each request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_owned();
    let is_hx = is_hx_request(&request);

    let response = next.run(request).await;

    tracing::info!(
        path,
        is_hx,
        status = response.status().as_u16(),
        duration = ?start.elapsed(),
        "request"
    );

    response
}
