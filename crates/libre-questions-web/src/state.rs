//! Shared application state.
//!
//! Built once at startup and injected into the router. Nothing in it is
//! mutated after construction; the only shared mutable resource is the
//! database pool inside [`CounterService`].

use std::path::PathBuf;

use crate::counter::CounterService;
use crate::templates::Templates;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// Name and counter operations.
    pub counter: CounterService,
    /// Parsed page and fragment templates.
    pub templates: Templates,
    /// Root directory for static assets.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Assemble the application state.
    pub fn new(
        counter: CounterService,
        templates: Templates,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            counter,
            templates,
            static_dir: static_dir.into(),
        }
    }
}
