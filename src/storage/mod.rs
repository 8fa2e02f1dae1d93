//! # Storage Collaborators
//!
//! Traits the reconciliation engine consumes for persistence, and their SQLite
//! implementations.
//!
//! - [`NetworkRepository`] loads the target network
//! - [`NetworkHostRepository`] lists the hosts declared for it
//! - [`UnitOfWork`] opens a [`RouteSetupTransaction`] in which setup rows are
//!   replaced before the OS call, and committed only after it succeeds
//!
//! A unit of work is injected per use case instead of being reached through a
//! global, so tests can observe every staged write and force failures at each
//! step.

pub mod errors;
pub mod repositories;
pub mod unit_of_work;

pub use errors::StorageError;
pub use repositories::{SqliteNetworkHostRepository, SqliteNetworkRepository};
pub use unit_of_work::{SqliteRouteSetupTransaction, SqliteUnitOfWork};

use crate::models::{BatchOutcome, Network, NetworkHost, NetworkHostFilter, NewNetworkHostSetup};
use async_trait::async_trait;

#[async_trait]
pub trait NetworkRepository: Send + Sync {
    /// Load a network, failing with [`StorageError::NotFound`] when absent
    async fn get(&self, id: i64) -> Result<Network, StorageError>;
}

#[async_trait]
pub trait NetworkHostRepository: Send + Sync {
    async fn list(&self, filter: &NetworkHostFilter) -> Result<Vec<NetworkHost>, StorageError>;
}

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn RouteSetupTransaction>, StorageError>;
}

/// Staged setup writes. Dropping without [`commit`](Self::commit) discards them.
#[async_trait]
pub trait RouteSetupTransaction: Send {
    async fn delete_setups_by_network_host_ids(
        &mut self,
        network_host_ids: &[i64],
    ) -> Result<BatchOutcome, StorageError>;

    async fn add_setups(
        &mut self,
        setups: &[NewNetworkHostSetup],
    ) -> Result<BatchOutcome, StorageError>;

    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}
