//! Configuration loading.
//!
//! Settings come from an optional YAML file (`libre-questions.yaml` in the
//! working directory by default). Every field has a default, so a missing
//! file or a partial one is fine. Selected values can be overridden by
//! environment variables, applied after the file is parsed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use libre_questions_db::DatabaseConfig;
use serde::Deserialize;

use crate::server::{self, ServerConfig};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "libre-questions.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid {var}: {message}")]
    Env {
        /// The offending variable.
        var: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerSection,

    /// Database file and pool settings.
    #[serde(default)]
    pub database: DatabaseSection,

    /// Template and static asset locations.
    #[serde(default)]
    pub assets: AssetsSection,
}

impl AppConfig {
    /// Load `path` if it exists, otherwise start from defaults. Env
    /// overrides are applied in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or an override is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    ///
    /// - `LQ_HOST`, `LQ_PORT` -- listen address
    /// - `LQ_DATABASE_PATH` -- database file
    /// - `LQ_TEMPLATES_DIR`, `LQ_STATIC_DIR` -- asset locations
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `LQ_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("LQ_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LQ_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Env {
                var: "LQ_PORT",
                message: format!("{e}"),
            })?;
        }
        if let Ok(val) = std::env::var("LQ_DATABASE_PATH") {
            self.database.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("LQ_TEMPLATES_DIR") {
            self.assets.templates_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("LQ_STATIC_DIR") {
            self.assets.static_dir = PathBuf::from(val);
        }
        Ok(())
    }

    /// Listen address for [`crate::server::start_server`].
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
        }
    }

    /// Pool settings for [`libre_questions_db::Database::connect`].
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database.path)
            .with_max_connections(self.database.max_connections)
            .with_busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }
}

/// Listen address settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host to bind. Loopback by default.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSection {
    /// Database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Milliseconds a writer waits for the database lock.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Template and static asset locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetsSection {
    /// Directory of `*.html` templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Root of the static file tree.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            static_dir: default_static_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    server::DEFAULT_HOST.to_owned()
}

const fn default_port() -> u16 {
    server::DEFAULT_PORT
}

fn default_database_path() -> PathBuf {
    PathBuf::from(libre_questions_db::sqlite::DEFAULT_DATABASE_PATH)
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("public/templates")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public/static")
}
