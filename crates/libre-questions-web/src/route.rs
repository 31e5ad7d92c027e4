//! Route table.
//!
//! Every request path maps to exactly one [`Route`]. The two action names
//! are reserved; any other path naming a loaded template is a page; the
//! rest falls through to the static asset root.

use crate::templates::Templates;

/// Logical path of the set-name action.
pub const SET_NAME_PATH: &str = "name";

/// Logical path of the increment action.
pub const INCREASE_COUNT_PATH: &str = "increase_count";

/// Page rendered for `/`.
pub const INDEX_PAGE: &str = "index";

/// Fragment rendered after a successful set-name.
pub const GREETING_FRAGMENT: &str = "greeting";

/// Fragment rendered after an increment.
pub const COUNTER_FRAGMENT: &str = "counter";

/// What a request is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Set the caller's display name.
    SetName,
    /// Add one to the caller's counter.
    IncreaseCount,
    /// Render the named template with the caller's record.
    Page(String),
    /// Serve a file from the static root.
    Static,
}

impl Route {
    /// Resolve a request path against the action names and `templates`.
    pub fn resolve(path: &str, templates: &Templates) -> Self {
        match logical_path(path) {
            SET_NAME_PATH => Self::SetName,
            INCREASE_COUNT_PATH => Self::IncreaseCount,
            page if templates.contains(page) => Self::Page(page.to_owned()),
            _ => Self::Static,
        }
    }
}

/// `/` becomes the index page; otherwise the leading slash is dropped.
pub fn logical_path(path: &str) -> &str {
    match path {
        "" | "/" => INDEX_PAGE,
        _ => path.strip_prefix('/').unwrap_or(path),
    }
}
