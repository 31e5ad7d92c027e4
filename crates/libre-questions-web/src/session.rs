//! Cookie-based visitor identity.
//!
//! A visitor is whoever holds a given `id` cookie. On the first request
//! without one, a fresh token is drawn from the operating system's CSPRNG
//! and handed back in a single `Set-Cookie` header. Requests that already
//! carry the cookie reuse its value and never receive a new one.

use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use cookie::{Cookie, SameSite};
use rand::TryRngCore;
use rand::rngs::OsRng;
use time::OffsetDateTime;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "id";

/// Lifetime of a newly issued session cookie.
pub const SESSION_TTL: time::Duration = time::Duration::days(7);

/// Random bytes per token (hex-encoded to twice as many characters).
const TOKEN_BYTES: usize = 32;

/// Errors raised while creating a session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operating system could not supply secure randomness.
    #[error("secure randomness unavailable: {0}")]
    Entropy(String),
}

/// Opaque session token identifying one visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Draw a new token: 32 bytes from the OS CSPRNG, lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Entropy`] if the OS random source fails.
    pub fn try_generate() -> Result<Self, SessionError> {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SessionError::Entropy(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    /// Draw a new token, aborting if no secure randomness is available.
    ///
    /// # Panics
    ///
    /// Panics when [`SessionId::try_generate`] fails.
    #[allow(clippy::panic)]
    pub fn generate() -> Self {
        match Self::try_generate() {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "session generator failed");
                panic!("cannot issue session token: {e}");
            }
        }
    }

    /// Accept a token presented by the client. Empty values are rejected.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_owned()))
        }
    }

    /// The token as sent in the cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity resolved for the current request.
///
/// Inserted into request extensions by [`resolve_session`].
#[derive(Debug, Clone)]
pub struct Session {
    /// The visitor's token.
    pub id: SessionId,
    /// Whether the token was issued by this request.
    pub issued: bool,
}

/// Find the first non-empty `id` cookie in the request headers.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .and_then(|cookie| SessionId::from_cookie_value(cookie.value()))
}

/// Build the cookie that hands `id` to the client.
///
/// `HttpOnly`, `SameSite=Strict`, scoped to `/`, expiring [`SESSION_TTL`]
/// from now.
pub fn session_cookie(id: &SessionId) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, id.as_str().to_owned()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/");

    if let Some(expires) = OffsetDateTime::now_utc().checked_add(SESSION_TTL) {
        builder = builder.expires(expires);
    }

    builder.build()
}

/// Middleware resolving the caller's identity before any handler runs.
///
/// Reuses a presented `id` cookie, otherwise issues a new token and
/// appends exactly one `Set-Cookie` header to the response.
pub async fn resolve_session(mut request: Request, next: Next) -> Response {
    let session = match session_from_headers(request.headers()) {
        Some(id) => Session { id, issued: false },
        None => Session {
            id: SessionId::generate(),
            issued: true,
        },
    };

    let issued = session.issued.then(|| session_cookie(&session.id));
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if let Some(cookie) = issued {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "session cookie is not a valid header value"),
        }
    }

    response
}
