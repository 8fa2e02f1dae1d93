//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are merged in order with
//! the `config` crate: defaults, the TOML file, then environment variables.

use super::error::{ConfigResult, ConfigurationError};
use super::{default_config_file, SplitRouteConfig};
use crate::constants::app;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SplitRouteConfig,
    environment: String,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from the default file location and the process environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_file(None)
    }

    /// Load configuration from an explicit file, which must then exist
    pub fn load_from_file(config_file: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_env(config_file, None)
    }

    /// Load configuration with an explicit environment variable map instead of
    /// the process environment. Useful for tests.
    pub fn load_with_env(
        config_file: Option<PathBuf>,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();

        let (file, required) = match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigurationError::FileNotFound { path });
                }
                (Some(path), true)
            }
            None => (default_config_file(), false),
        };

        debug!(
            environment = %environment,
            config_file = ?file,
            "Loading configuration"
        );

        let config = Self::build(file.as_deref(), required, env_vars)?;
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_file: file.filter(|path| path.is_file()),
        }))
    }

    /// Wrap an already-built configuration after validating it
    pub fn from_config(config: SplitRouteConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            config_file: None,
        }))
    }

    fn build(
        file: Option<&Path>,
        required: bool,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<SplitRouteConfig> {
        let defaults = SplitRouteConfig::default();

        let mut builder = Config::builder()
            .set_default(
                "database.path",
                defaults.database.path.to_string_lossy().into_owned(),
            )?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default(
                "storage.insert_chunk_size",
                defaults.storage.insert_chunk_size as i64,
            )?
            .set_default(
                "storage.delete_chunk_size",
                defaults.storage.delete_chunk_size as i64,
            )?
            .set_default("logging.format", "text")?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(app::ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env_vars),
        );

        Ok(builder.build()?.try_deserialize::<SplitRouteConfig>()?)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SplitRouteConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// File that contributed to this configuration, if one existed
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Detect current environment: SPLITROUTE_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("SPLITROUTE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}
