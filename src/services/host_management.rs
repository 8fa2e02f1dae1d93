//! # Host Management Service
//!
//! Network and host mutations, each followed by the route sync that keeps the
//! OS additional routes in line with what was declared.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{
    Network, NetworkHost, NetworkHostFilter, NetworkHostSetup, NewNetwork, NewNetworkHost,
};
use crate::reconciliation::{ReconcileError, ReconcileOutcome, RouteReconciler};

/// Error types for host management operations
#[derive(Debug, thiserror::Error)]
pub enum HostManagementError {
    #[error("Network not found: {network_id}")]
    NetworkNotFound { network_id: i64 },

    #[error("Network already exists: {name}")]
    NetworkAlreadyExists { name: String },

    #[error("Host not found: {host_id}")]
    HostNotFound { host_id: i64 },

    #[error("Invalid {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },

    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl HostManagementError {
    fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| HostManagementError::Database { operation, source }
    }
}

/// A host to declare, as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInput {
    pub address: String,
    pub description: Option<String>,
}

impl HostInput {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of adding hosts to a network
#[derive(Debug, Clone, Serialize)]
pub struct AddHostsReport {
    pub added: Vec<NetworkHost>,
    /// Addresses already declared for the network
    pub skipped: Vec<String>,
    pub sync: ReconcileOutcome,
}

#[derive(Clone)]
pub struct HostManagementService {
    db_pool: SqlitePool,
    reconciler: Arc<RouteReconciler>,
}

impl HostManagementService {
    pub fn new(db_pool: SqlitePool, reconciler: Arc<RouteReconciler>) -> Self {
        Self {
            db_pool,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &Arc<RouteReconciler> {
        &self.reconciler
    }

    pub async fn add_network(&self, name: &str) -> Result<Network, HostManagementError> {
        let name = non_blank("network name", name)?;

        if Network::find_by_name(&self.db_pool, name)
            .await
            .map_err(HostManagementError::database("find network"))?
            .is_some()
        {
            return Err(HostManagementError::NetworkAlreadyExists {
                name: name.to_string(),
            });
        }

        let network = Network::create(
            &self.db_pool,
            NewNetwork {
                name: name.to_string(),
            },
        )
        .await
        .map_err(HostManagementError::database("create network"))?;

        info!(network_id = network.id, network = %network.name, "Network added");
        Ok(network)
    }

    pub async fn list_networks(&self) -> Result<Vec<Network>, HostManagementError> {
        Network::list_all(&self.db_pool)
            .await
            .map_err(HostManagementError::database("list networks"))
    }

    /// Clear the network's routes, then delete it with its hosts and setups.
    ///
    /// The reset only touches the OS when the network is the connected VPN.
    pub async fn remove_network(
        &self,
        network_id: i64,
    ) -> Result<ReconcileOutcome, HostManagementError> {
        self.require_network(network_id).await?;
        let outcome = self.reconciler.reset_by_network_id(network_id).await?;

        Network::delete(&self.db_pool, network_id)
            .await
            .map_err(HostManagementError::database("delete network"))?;

        info!(network_id = network_id, "Network removed");
        Ok(outcome)
    }

    /// Declare hosts for a network and sync it.
    ///
    /// Addresses already declared are skipped, whether they were present
    /// before the call or repeated within it. Every address is validated
    /// before the first insert, so an invalid one leaves the network as it was.
    pub async fn add_hosts(
        &self,
        network_id: i64,
        hosts: Vec<HostInput>,
    ) -> Result<AddHostsReport, HostManagementError> {
        self.require_network(network_id).await?;

        let new_hosts = hosts
            .into_iter()
            .map(|host| {
                Ok(NewNetworkHost {
                    network_id,
                    address: host_address(&host.address)?,
                    description: host.description,
                })
            })
            .collect::<Result<Vec<_>, HostManagementError>>()?;

        let mut added = Vec::new();
        let mut skipped = Vec::new();
        for new_host in new_hosts {
            let address = new_host.address.clone();
            let created = NetworkHost::create_if_absent(&self.db_pool, new_host)
                .await
                .map_err(HostManagementError::database("create network host"))?;

            match created {
                Some(host) => added.push(host),
                None => {
                    debug!(network_id = network_id, address = %address, "Host already declared");
                    skipped.push(address);
                }
            }
        }

        let sync = self.reconciler.sync_by_network_id(network_id).await?;
        Ok(AddHostsReport {
            added,
            skipped,
            sync,
        })
    }

    /// Delete a host and sync its network
    pub async fn remove_host(&self, host_id: i64) -> Result<ReconcileOutcome, HostManagementError> {
        let host = NetworkHost::find_by_id(&self.db_pool, host_id)
            .await
            .map_err(HostManagementError::database("find network host"))?
            .ok_or(HostManagementError::HostNotFound { host_id })?;

        NetworkHost::delete(&self.db_pool, host_id)
            .await
            .map_err(HostManagementError::database("delete network host"))?;

        info!(host_id = host_id, address = %host.address, "Host removed");
        Ok(self.reconciler.sync_by_network_id(host.network_id).await?)
    }

    pub async fn list_hosts(&self, network_id: i64) -> Result<Vec<NetworkHost>, HostManagementError> {
        self.require_network(network_id).await?;
        NetworkHost::list(&self.db_pool, &NetworkHostFilter::for_network(network_id))
            .await
            .map_err(HostManagementError::database("list network hosts"))
    }

    /// Setups persisted by the last successful sync of a network
    pub async fn list_setups(
        &self,
        network_id: i64,
    ) -> Result<Vec<NetworkHostSetup>, HostManagementError> {
        self.require_network(network_id).await?;
        NetworkHostSetup::list_by_network(&self.db_pool, network_id)
            .await
            .map_err(HostManagementError::database("list network host setups"))
    }

    async fn require_network(&self, network_id: i64) -> Result<Network, HostManagementError> {
        Network::find_by_id(&self.db_pool, network_id)
            .await
            .map_err(HostManagementError::database("find network"))?
            .ok_or(HostManagementError::NetworkNotFound { network_id })
    }
}

fn non_blank<'a>(field: &'static str, value: &'a str) -> Result<&'a str, HostManagementError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HostManagementError::InvalidInput {
            field,
            value: value.to_string(),
        });
    }
    Ok(trimmed)
}

/// Trimmed address with no inner whitespace
fn host_address(value: &str) -> Result<String, HostManagementError> {
    let address = non_blank("host address", value)?;
    if address.chars().any(char::is_whitespace) {
        return Err(HostManagementError::InvalidInput {
            field: "host address",
            value: address.to_string(),
        });
    }
    Ok(address.to_string())
}
