//! Page and fragment templates rendered with `minijinja`.
//!
//! Every `*.html` file in the templates directory is registered under its
//! file stem, so `index.html` becomes the `index` page and `counter.html`
//! the `counter` fragment. Templates can `{% include %}` each other by
//! those names. Output is always HTML-escaped.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use libre_questions_db::UserRecord;
use minijinja::{AutoEscape, Environment};

/// File extension of template sources.
const TEMPLATE_EXTENSION: &str = "html";

/// Errors raised while loading or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The templates directory or a file in it could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A template failed to parse.
    #[error("failed to add template {name}: {source}")]
    Syntax {
        /// Template name.
        name: String,
        /// The underlying parse error.
        source: minijinja::Error,
    },

    /// A template failed to render.
    #[error("failed to render template {name}: {source}")]
    Render {
        /// Template name.
        name: String,
        /// The underlying render error.
        source: minijinja::Error,
    },
}

/// The parsed template set, shared read-only by all requests.
pub struct Templates {
    env: Environment<'static>,
    names: BTreeSet<String>,
}

impl Templates {
    /// Load every `*.html` file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the directory cannot be listed or a
    /// file cannot be read, or [`TemplateError::Syntax`] if a file is not a
    /// valid template.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let entries = std::fs::read_dir(dir).map_err(|source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| TemplateError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            sources.push((name.to_owned(), source));
        }

        let templates = Self::from_sources(sources)?;
        tracing::info!(
            dir = %dir.display(),
            count = templates.names.len(),
            names = ?templates.names().collect::<Vec<_>>(),
            "Templates loaded"
        );
        Ok(templates)
    }

    /// Build a template set from `(name, source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if a source is not a valid template.
    pub fn from_sources<I>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        let mut names = BTreeSet::new();
        for (name, source) in sources {
            env.add_template_owned(name.clone(), source)
                .map_err(|source| TemplateError::Syntax {
                    name: name.clone(),
                    source,
                })?;
            names.insert(name);
        }

        Ok(Self { env, names })
    }

    /// Whether a template called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names of all loaded templates, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Render `name` with the fields of `record` in scope.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the template is missing or
    /// rendering fails.
    pub fn render(&self, name: &str, record: &UserRecord) -> Result<String, TemplateError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(record))
            .map_err(|source| TemplateError::Render {
                name: name.to_owned(),
                source,
            })
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}
