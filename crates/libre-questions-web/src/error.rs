//! Error types for the HTTP layer.
//!
//! [`WebError`] unifies all failure modes at the handler boundary and
//! converts into a bare status code with an empty body. Server-side
//! failures are logged with the failing operation before the response is
//! produced.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::counter::CounterError;
use crate::templates::TemplateError;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The client submitted an empty or unreadable name.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A counter or store operation failed.
    #[error(transparent)]
    Counter(CounterError),

    /// A template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<CounterError> for WebError {
    fn from(err: CounterError) -> Self {
        match err {
            CounterError::EmptyName => Self::BadRequest(CounterError::EmptyName.to_string()),
            other @ CounterError::Store { .. } => Self::Counter(other),
        }
    }
}

impl WebError {
    /// HTTP status reported for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Counter(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        status.into_response()
    }
}
