//! SQLite unit of work wrapping a pool transaction.

use super::{RouteSetupTransaction, StorageError, UnitOfWork};
use crate::config::StorageConfig;
use crate::models::{BatchOutcome, NetworkHostSetup, NewNetworkHostSetup};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

#[derive(Debug, Clone)]
pub struct SqliteUnitOfWork {
    pool: SqlitePool,
    insert_chunk_size: usize,
    delete_chunk_size: usize,
}

impl SqliteUnitOfWork {
    pub fn new(pool: SqlitePool, storage: &StorageConfig) -> Self {
        Self {
            pool,
            insert_chunk_size: storage.insert_chunk_size,
            delete_chunk_size: storage.delete_chunk_size,
        }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn RouteSetupTransaction>, StorageError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(StorageError::database("begin transaction"))?;

        Ok(Box::new(SqliteRouteSetupTransaction {
            tx,
            insert_chunk_size: self.insert_chunk_size,
            delete_chunk_size: self.delete_chunk_size,
        }))
    }
}

pub struct SqliteRouteSetupTransaction {
    tx: Transaction<'static, Sqlite>,
    insert_chunk_size: usize,
    delete_chunk_size: usize,
}

#[async_trait]
impl RouteSetupTransaction for SqliteRouteSetupTransaction {
    async fn delete_setups_by_network_host_ids(
        &mut self,
        network_host_ids: &[i64],
    ) -> Result<BatchOutcome, StorageError> {
        NetworkHostSetup::delete_batch_by_network_host_ids(
            &mut self.tx,
            network_host_ids,
            self.delete_chunk_size,
        )
        .await
        .map_err(StorageError::database("delete network host setups"))
    }

    async fn add_setups(
        &mut self,
        setups: &[NewNetworkHostSetup],
    ) -> Result<BatchOutcome, StorageError> {
        NetworkHostSetup::add_batch(&mut self.tx, setups, self.insert_chunk_size)
            .await
            .map_err(StorageError::database("add network host setups"))
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.tx
            .commit()
            .await
            .map_err(StorageError::database("commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        self.tx
            .rollback()
            .await
            .map_err(StorageError::database("rollback transaction"))
    }
}
