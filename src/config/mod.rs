//! # Splitroute Configuration System
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `SPLITROUTE__SECTION__KEY` environment variables. The merged result is
//! validated before anything uses it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use splitroute::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let database_path = &manager.config().database.path;
//! let insert_chunk = manager.config().storage.insert_chunk_size;
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! ```toml
//! [database]
//! path = "/Users/me/Library/Application Support/com.splitroute.splitroute/splitroute.db"
//! max_connections = 5
//!
//! [storage]
//! insert_chunk_size = 100
//! delete_chunk_size = 500
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

pub mod error;
pub mod loader;

use crate::constants::{app, storage};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SplitRouteConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// SQLite database location and pool size
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_data_dir().join(storage::DATABASE_FILE_NAME),
            max_connections: storage::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Chunk sizes for batched setup writes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Rows per multi-row INSERT
    pub insert_chunk_size: usize,
    /// Host ids per DELETE ... IN (...)
    pub delete_chunk_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            insert_chunk_size: storage::DEFAULT_INSERT_CHUNK_SIZE,
            delete_chunk_size: storage::DEFAULT_DELETE_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; the environment default applies when unset
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

impl SplitRouteConfig {
    /// Check value ranges that deserialization cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                self.database.max_connections,
                "must be at least 1",
            ));
        }

        let insert = self.storage.insert_chunk_size;
        let max_insert_rows = storage::SQLITE_MAX_BIND_PARAMETERS / storage::SETUP_INSERT_BINDS_PER_ROW;
        if insert == 0 || insert > max_insert_rows {
            return Err(ConfigurationError::invalid_value(
                "storage.insert_chunk_size",
                insert,
                format!("must be between 1 and {max_insert_rows}"),
            ));
        }

        let delete = self.storage.delete_chunk_size;
        if delete == 0 || delete > storage::SQLITE_MAX_BIND_PARAMETERS {
            return Err(ConfigurationError::invalid_value(
                "storage.delete_chunk_size",
                delete,
                format!("must be between 1 and {}", storage::SQLITE_MAX_BIND_PARAMETERS),
            ));
        }
        if delete < insert {
            return Err(ConfigurationError::invalid_value(
                "storage.delete_chunk_size",
                delete,
                format!("must not be smaller than storage.insert_chunk_size ({insert})"),
            ));
        }

        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "logging.level",
                    level,
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(app::QUALIFIER, app::ORGANIZATION, app::APPLICATION)
}

/// Platform data directory, e.g. `~/Library/Application Support/com.splitroute.splitroute`
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".splitroute"))
}

/// Default location of the optional configuration file
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(app::CONFIG_FILE_NAME))
}
