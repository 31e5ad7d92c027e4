//! Startup wiring: configuration in, ready [`AppState`] out.
//!
//! Any failure here is fatal; the binary exits before serving.

use libre_questions_db::{Database, DbError};

use crate::config::AppConfig;
use crate::counter::CounterService;
use crate::state::AppState;
use crate::templates::{TemplateError, Templates};

/// Errors that can occur while preparing the service.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The database could not be opened or migrated.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// The templates could not be loaded.
    #[error("template error: {0}")]
    Templates(#[from] TemplateError),
}

/// Open and migrate the database, then load the templates.
///
/// # Errors
///
/// Returns [`StartupError`] if either step fails.
pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let templates = Templates::load(&config.assets.templates_dir)?;

    let db = Database::connect(&config.database_config()).await?;
    db.run_migrations().await?;

    Ok(AppState::new(
        CounterService::new(db),
        templates,
        config.assets.static_dir.clone(),
    ))
}
