//! HTTP front end for Libre Questions.
//!
//! Every visitor is identified by a random session token carried in the
//! `id` cookie. A visitor can set a display name and bump a personal
//! counter; both persist in the embedded database from
//! [`libre_questions_db`].
//!
//! # Request flow
//!
//! ```text
//! request
//!   -> log_request      (path, HX flag, duration)
//!   -> resolve_session  (read or issue the `id` cookie)
//!   -> dispatch         (Route::resolve)
//!        |-- SetName        -> CounterService::set_name   -> `greeting` partial
//!        |-- IncreaseCount  -> CounterService::increment  -> `counter` partial
//!        |-- Page(name)     -> CounterService::current    -> page template
//!        +-- Static         -> files under the static root
//! ```
//!
//! All shared state lives in [`AppState`], built once at startup and
//! injected into the router.

pub mod config;
pub mod counter;
pub mod error;
pub mod handlers;
pub mod route;
pub mod router;
pub mod server;
pub mod session;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod templates;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError};
pub use counter::{CounterError, CounterService};
pub use error::WebError;
pub use route::Route;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use session::{Session, SessionId};
pub use startup::{StartupError, build_state};
pub use state::AppState;
pub use templates::{TemplateError, Templates};
