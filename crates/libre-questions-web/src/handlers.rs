//! Request handlers.
//!
//! A single entry point, [`dispatch`], resolves the [`Route`] for the
//! request path and runs the matching flow. The caller's [`Session`] has
//! already been resolved by the session middleware.
//!
//! # Endpoints
//!
//! | Path | Description |
//! |------|-------------|
//! | `/` | `index` page with the caller's record |
//! | `/name?name=...` | Set display name, render `greeting` fragment |
//! | `/increase_count` | Increment counter, render `counter` fragment |
//! | `/<template>` | Any other template, rendered with the caller's record |
//! | anything else | Static file from the asset root |
//!
//! Methods are not distinguished.

use std::sync::Arc;

use axum::extract::{Extension, FromRequest, Query, Request, State};
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use libre_questions_db::UserRecord;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::WebError;
use crate::route::{COUNTER_FRAGMENT, GREETING_FRAGMENT, Route};
use crate::session::Session;
use crate::state::AppState;

/// Media type of HTML form submissions.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Query or form parameters accepted by the set-name action.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NameParams {
    /// The requested display name.
    pub name: Option<String>,
}

/// Route the request and run the matching flow.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    request: Request,
) -> Result<Response, WebError> {
    match Route::resolve(request.uri().path(), &state.templates) {
        Route::SetName => set_name(&state, &session, request).await,
        Route::IncreaseCount => increase_count(&state, &session).await,
        Route::Page(page) => render_page(&state, &session, &page).await,
        Route::Static => Ok(serve_static(&state, request).await),
    }
}

async fn set_name(
    state: &AppState,
    session: &Session,
    request: Request,
) -> Result<Response, WebError> {
    let name = read_name(request).await?;
    let record = state.counter.set_name(&session.id, &name).await?;
    render(state, GREETING_FRAGMENT, &record)
}

async fn increase_count(state: &AppState, session: &Session) -> Result<Response, WebError> {
    let record = state.counter.increment(&session.id).await?;
    render(state, COUNTER_FRAGMENT, &record)
}

async fn render_page(
    state: &AppState,
    session: &Session,
    page: &str,
) -> Result<Response, WebError> {
    let record = state.counter.current(&session.id).await?;
    render(state, page, &record)
}

fn render(state: &AppState, template: &str, record: &UserRecord) -> Result<Response, WebError> {
    let body = state.templates.render(template, record)?;
    Ok(Html(body).into_response())
}

async fn serve_static(state: &AppState, mut request: Request) -> Response {
    // The file server only answers GET and HEAD; every other verb reads as GET.
    if request.method() != Method::HEAD {
        *request.method_mut() = Method::GET;
    }
    let Ok(response) = ServeDir::new(&state.static_dir).oneshot(request).await;
    response.into_response()
}

/// Read the `name` value from a url-encoded form body, falling back to
/// the query string. A missing value reads as empty.
///
/// # Errors
///
/// Returns [`WebError::BadRequest`] if the form body cannot be decoded.
pub async fn read_name(request: Request) -> Result<String, WebError> {
    let query_name = Query::<NameParams>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.name);

    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

    let form_name = if is_form {
        let Form(params) = Form::<NameParams>::from_request(request, &())
            .await
            .map_err(|rejection| WebError::BadRequest(rejection.body_text()))?;
        params.name
    } else {
        None
    };

    Ok(form_name.or(query_name).unwrap_or_default())
}
