use crate::config::DatabaseConfig;
use crate::storage::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub struct DatabaseConnection {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl DatabaseConnection {
    /// Open (creating if needed) the database file and apply pending migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(StorageError::database("connect"))?;

        let connection = Self {
            pool,
            path: Some(config.path.clone()),
        };
        connection.migrate().await?;

        info!(path = %config.path.display(), "Database ready");
        Ok(connection)
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Limited to a single long-lived connection, since every SQLite memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StorageError::database("parse connection options"))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::database("connect"))?;

        let connection = Self { pool, path: None };
        connection.migrate().await?;
        Ok(connection)
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn health_check(&self) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::database("health check"))?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
