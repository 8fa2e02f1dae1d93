//! # Route Reconciler
//!
//! Sync and reset use cases for one network. Every call re-derives the desired
//! routes from storage, the OS and DNS; nothing is cached between calls.
//!
//! The storage writes and the OS call form a two-phase apply: setup rows are
//! staged inside a [`RouteSetupTransaction`], the additional routes are pushed
//! to the OS, and only then is the transaction committed. A failed OS call
//! rolls the staged rows back. A failed commit after a successful OS call is
//! reported as [`ReconcileError::RoutesAppliedCommitFailed`].

use super::errors::{ApplyFailure, ApplyStep, ReconcileError};
use super::guard::{ensure_network_active, Activation};
use super::network_info::discover_network_info;
use crate::config::StorageConfig;
use crate::logging::log_route_operation;
use crate::models::{Network, NetworkHostFilter, NewNetworkHostSetup};
use crate::resolver::{HostResolver, SystemResolver};
use crate::storage::{
    NetworkHostRepository, NetworkRepository, RouteSetupTransaction, SqliteNetworkHostRepository,
    SqliteNetworkRepository, SqliteUnitOfWork, StorageError, UnitOfWork,
};
use crate::system::{CommandExecutor, SystemNetwork};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How a sync or reset ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Routes were pushed to the OS and the setup rows committed
    Applied { routes: usize },
    /// No VPN connected, nothing touched
    NoActiveVpn,
    /// Another VPN is connected, nothing touched
    NotActive { active_vpn: String },
}

impl ReconcileOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied { .. })
    }
}

pub struct RouteReconciler {
    networks: Arc<dyn NetworkRepository>,
    hosts: Arc<dyn NetworkHostRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    system: Arc<dyn SystemNetwork>,
    resolver: Arc<dyn HostResolver>,
}

impl RouteReconciler {
    pub fn new(
        networks: Arc<dyn NetworkRepository>,
        hosts: Arc<dyn NetworkHostRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        system: Arc<dyn SystemNetwork>,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        Self {
            networks,
            hosts,
            unit_of_work,
            system,
            resolver,
        }
    }

    /// Production wiring: SQLite storage, OS commands and the system resolver
    pub fn from_pool(pool: SqlitePool, storage: &StorageConfig) -> Self {
        Self::with_system(pool, storage, Arc::new(CommandExecutor::new()))
    }

    /// SQLite storage and system resolver with a caller-supplied OS layer
    pub fn with_system(
        pool: SqlitePool,
        storage: &StorageConfig,
        system: Arc<dyn SystemNetwork>,
    ) -> Self {
        Self::new(
            Arc::new(SqliteNetworkRepository::new(pool.clone())),
            Arc::new(SqliteNetworkHostRepository::new(pool.clone())),
            Arc::new(SqliteUnitOfWork::new(pool, storage)),
            system,
            Arc::new(SystemResolver),
        )
    }

    pub fn system(&self) -> &Arc<dyn SystemNetwork> {
        &self.system
    }

    /// Rebuild and apply the additional routes of a network from its hosts.
    ///
    /// A single host that fails to resolve, or resolves to no IPv4 address,
    /// aborts the whole sync before anything is written.
    #[instrument(skip(self))]
    pub async fn sync_by_network_id(
        &self,
        network_id: i64,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let network = self.load_network(network_id).await?;
        let setups = self.desired_setups(&network).await?;

        match self.gate("sync", &network).await? {
            Some(skipped) => Ok(skipped),
            None => {
                let outcome = self.apply(&network, &setups, true).await?;
                log_route_operation("sync", network.id, Some(&network.name), "completed", None);
                Ok(outcome)
            }
        }
    }

    /// Clear the additional routes of a network. Persisted setups are left
    /// untouched.
    #[instrument(skip(self))]
    pub async fn reset_by_network_id(
        &self,
        network_id: i64,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let network = self.load_network(network_id).await?;

        match self.gate("reset", &network).await? {
            Some(skipped) => Ok(skipped),
            None => {
                let outcome = self.apply(&network, &[], false).await?;
                log_route_operation("reset", network.id, Some(&network.name), "completed", None);
                Ok(outcome)
            }
        }
    }

    async fn load_network(&self, network_id: i64) -> Result<Network, ReconcileError> {
        self.networks.get(network_id).await.map_err(|err| match err {
            StorageError::NotFound { .. } => ReconcileError::NetworkNotFound { network_id },
            other => ReconcileError::Storage(other),
        })
    }

    /// One setup per (host, resolved IPv4 address), all sharing the mask and
    /// router of a single discovery
    async fn desired_setups(
        &self,
        network: &Network,
    ) -> Result<Vec<NewNetworkHostSetup>, ReconcileError> {
        let hosts = self
            .hosts
            .list(&NetworkHostFilter::for_network(network.id))
            .await?;
        let info = discover_network_info(self.system.as_ref()).await?;

        let mut setups = Vec::with_capacity(hosts.len());
        for host in &hosts {
            let ips = self
                .resolver
                .lookup_ipv4(&host.address)
                .await
                .map_err(|source| ReconcileError::DnsResolution {
                    address: host.address.clone(),
                    source,
                })?;

            if ips.is_empty() {
                return Err(ReconcileError::NoIpv4Address {
                    address: host.address.clone(),
                });
            }

            setups.extend(ips.into_iter().map(|ip| NewNetworkHostSetup {
                network_host_id: host.id,
                network_host_ip: ip.to_string(),
                subnet_mask: info.subnet_mask.clone(),
                router: info.router.clone(),
            }));
        }

        debug!(
            network_id = network.id,
            hosts = hosts.len(),
            setups = setups.len(),
            "Computed desired routes"
        );
        Ok(setups)
    }

    /// `Some(outcome)` when the network must not touch routes right now
    async fn gate(
        &self,
        operation: &str,
        network: &Network,
    ) -> Result<Option<ReconcileOutcome>, ReconcileError> {
        match ensure_network_active(self.system.as_ref(), network).await? {
            Activation::Active(_) => Ok(None),
            Activation::NoVpn => {
                log_route_operation(
                    operation,
                    network.id,
                    Some(&network.name),
                    "skipped",
                    Some("no VPN connected"),
                );
                Ok(Some(ReconcileOutcome::NoActiveVpn))
            }
            Activation::OtherVpn(vpn) => {
                log_route_operation(
                    operation,
                    network.id,
                    Some(&network.name),
                    "skipped",
                    Some(&format!("active VPN is {vpn}")),
                );
                Ok(Some(ReconcileOutcome::NotActive {
                    active_vpn: vpn.to_string(),
                }))
            }
        }
    }

    async fn apply(
        &self,
        network: &Network,
        setups: &[NewNetworkHostSetup],
        stage_writes: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut tx = self
            .unit_of_work
            .begin()
            .await
            .map_err(|err| ReconcileError::apply(ApplyStep::Begin, err))?;

        if stage_writes && !setups.is_empty() {
            let host_ids = distinct_network_host_ids(setups);

            let deleted = tx.delete_setups_by_network_host_ids(&host_ids).await;
            if let Err(err) = deleted {
                return Err(abort(tx, ApplyStep::DeleteSetups, err).await);
            }

            let added = tx.add_setups(setups).await;
            if let Err(err) = added {
                return Err(abort(tx, ApplyStep::AddSetups, err).await);
            }
        }

        let pushed = self
            .system
            .set_network_additional_routes(network, setups)
            .await;
        if let Err(err) = pushed {
            return Err(abort(tx, ApplyStep::SetAdditionalRoutes, err).await);
        }

        tx.commit().await.map_err(|source| {
            warn!(
                network_id = network.id,
                network = %network.name,
                error = %source,
                "Routes applied to the OS but setup rows were not committed"
            );
            ReconcileError::RoutesAppliedCommitFailed {
                network: network.name.clone(),
                source,
            }
        })?;

        info!(
            network_id = network.id,
            network = %network.name,
            routes = setups.len(),
            "Applied additional routes"
        );
        Ok(ReconcileOutcome::Applied {
            routes: setups.len(),
        })
    }
}

async fn abort(
    tx: Box<dyn RouteSetupTransaction>,
    step: ApplyStep,
    failure: impl Into<ApplyFailure>,
) -> ReconcileError {
    if let Err(err) = tx.rollback().await {
        warn!(step = %step, error = %err, "Rollback failed");
    }
    ReconcileError::apply(step, failure)
}

fn distinct_network_host_ids(setups: &[NewNetworkHostSetup]) -> Vec<i64> {
    let mut ids: Vec<i64> = setups.iter().map(|s| s.network_host_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(host_id: i64, ip: &str) -> NewNetworkHostSetup {
        NewNetworkHostSetup {
            network_host_id: host_id,
            network_host_ip: ip.to_string(),
            subnet_mask: "255.255.255.0".to_string(),
            router: "10.0.0.1".to_string(),
        }
    }

    #[test]
    fn test_distinct_network_host_ids() {
        let setups = vec![
            setup(3, "10.0.0.5"),
            setup(1, "10.0.0.6"),
            setup(3, "10.0.0.7"),
        ];
        assert_eq!(distinct_network_host_ids(&setups), vec![1, 3]);
        assert!(distinct_network_host_ids(&[]).is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(ReconcileOutcome::NotActive {
            active_vpn: "Home".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "not_active");
        assert_eq!(json["active_vpn"], "Home");
        assert!(ReconcileOutcome::Applied { routes: 0 }.is_applied());
    }
}
