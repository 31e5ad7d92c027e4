//! Libre Questions server binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `libre-questions.yaml` (or defaults)
//! 3. Load templates, open the database, run migrations
//! 4. Serve HTTP until `Ctrl-C`
//! 5. Close the database pool

use std::path::Path;
use std::sync::Arc;

use libre_questions_web::config::{AppConfig, DEFAULT_CONFIG_FILE};
use libre_questions_web::{server, startup, telemetry};
use tracing::info;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup, or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    info!("libre-questions starting");

    let config = AppConfig::load(Path::new(DEFAULT_CONFIG_FILE))?;
    info!(
        host = config.server.host,
        port = config.server.port,
        database = %config.database.path.display(),
        templates = %config.assets.templates_dir.display(),
        static_dir = %config.assets.static_dir.display(),
        "Configuration loaded"
    );

    let state = Arc::new(startup::build_state(&config).await?);
    let db = state.counter.database().clone();

    let result = server::start_server(&config.server_config(), state).await;

    db.close().await;

    result?;
    info!("libre-questions shutdown complete");
    Ok(())
}
