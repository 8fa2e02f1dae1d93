//! SQLite-backed network and host repositories.

use super::{NetworkHostRepository, NetworkRepository, StorageError};
use crate::models::{Network, NetworkHost, NetworkHostFilter};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct SqliteNetworkRepository {
    pool: SqlitePool,
}

impl SqliteNetworkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NetworkRepository for SqliteNetworkRepository {
    async fn get(&self, id: i64) -> Result<Network, StorageError> {
        Network::find_by_id(&self.pool, id)
            .await
            .map_err(StorageError::database("load network"))?
            .ok_or(StorageError::NotFound {
                entity: "Network",
                id,
            })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteNetworkHostRepository {
    pool: SqlitePool,
}

impl SqliteNetworkHostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NetworkHostRepository for SqliteNetworkHostRepository {
    async fn list(&self, filter: &NetworkHostFilter) -> Result<Vec<NetworkHost>, StorageError> {
        NetworkHost::list(&self.pool, filter)
            .await
            .map_err(StorageError::database("list network hosts"))
    }
}
