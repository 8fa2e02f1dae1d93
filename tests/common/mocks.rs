//! In-memory doubles for the reconciliation collaborators.
//!
//! Every double records what it was asked to do so tests can assert on the
//! exact OS calls and staged storage writes of a sync.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use splitroute::models::{
    BatchOutcome, Network, NetworkHost, NetworkHostFilter, NetworkInfo, NetworkInterface,
    NetworkService, NewNetworkHostSetup, VpnService,
};
use splitroute::reconciliation::DiscoveryStep;
use splitroute::resolver::{HostResolver, ResolveError};
use splitroute::storage::{
    NetworkHostRepository, NetworkRepository, RouteSetupTransaction, StorageError, UnitOfWork,
};
use splitroute::system::{CommandError, SystemNetwork};

pub fn network(id: i64, name: &str) -> Network {
    Network {
        id,
        name: name.to_string(),
        created_at: Utc::now().naive_utc(),
    }
}

pub fn host(id: i64, network_id: i64, address: &str) -> NetworkHost {
    NetworkHost {
        id,
        network_id,
        address: address.to_string(),
        description: None,
        created_at: Utc::now().naive_utc(),
    }
}

pub fn setup(host_id: i64, ip: &str, subnet_mask: &str, router: &str) -> NewNetworkHostSetup {
    NewNetworkHostSetup {
        network_host_id: host_id,
        network_host_ip: ip.to_string(),
        subnet_mask: subnet_mask.to_string(),
        router: router.to_string(),
    }
}

fn failed(program: &str) -> CommandError {
    CommandError::Failed {
        program: program.to_string(),
        code: Some(1),
        stderr: "mock failure".to_string(),
    }
}

fn storage_failure(operation: &'static str) -> StorageError {
    StorageError::Database {
        operation,
        source: sqlx::Error::Protocol("mock failure".to_string()),
    }
}

/// One call made against [`MockSystemNetwork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCall {
    DefaultNetworkInterface,
    NetworkServiceByInterface(String),
    NetworkInfoByService(String),
    SetAdditionalRoutes {
        network: String,
        setups: Vec<NewNetworkHostSetup>,
    },
    ListVpn,
    CurrentVpn,
    OpenInFinder(PathBuf),
}

/// Scriptable OS layer
#[derive(Debug)]
pub struct MockSystemNetwork {
    active_vpn: Option<String>,
    vpn_services: Vec<String>,
    interface: String,
    service: String,
    info: NetworkInfo,
    fail_discovery: Option<DiscoveryStep>,
    fail_current_vpn: bool,
    fail_set_routes: bool,
    calls: Mutex<Vec<SystemCall>>,
}

impl MockSystemNetwork {
    /// Connected to `active_vpn`, default network en0 / Wi-Fi with
    /// 255.255.255.0 via 10.0.0.1
    pub fn connected_to(active_vpn: &str) -> Self {
        Self {
            active_vpn: Some(active_vpn.to_string()),
            vpn_services: vec![active_vpn.to_string()],
            ..Self::disconnected()
        }
    }

    pub fn disconnected() -> Self {
        Self {
            active_vpn: None,
            vpn_services: Vec::new(),
            interface: "en0".to_string(),
            service: "Wi-Fi".to_string(),
            info: NetworkInfo {
                subnet_mask: "255.255.255.0".to_string(),
                router: "10.0.0.1".to_string(),
            },
            fail_discovery: None,
            fail_current_vpn: false,
            fail_set_routes: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_network_info(mut self, subnet_mask: &str, router: &str) -> Self {
        self.info = NetworkInfo {
            subnet_mask: subnet_mask.to_string(),
            router: router.to_string(),
        };
        self
    }

    pub fn with_vpn_services(mut self, services: &[&str]) -> Self {
        self.vpn_services = services.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_discovery_at(mut self, step: DiscoveryStep) -> Self {
        self.fail_discovery = Some(step);
        self
    }

    pub fn failing_current_vpn(mut self) -> Self {
        self.fail_current_vpn = true;
        self
    }

    pub fn failing_set_routes(mut self) -> Self {
        self.fail_set_routes = true;
        self
    }

    pub fn calls(&self) -> Vec<SystemCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every `set_network_additional_routes` call
    pub fn route_calls(&self) -> Vec<(String, Vec<NewNetworkHostSetup>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SystemCall::SetAdditionalRoutes { network, setups } => Some((network, setups)),
                _ => None,
            })
            .collect()
    }

    pub fn discovery_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    SystemCall::DefaultNetworkInterface
                        | SystemCall::NetworkServiceByInterface(_)
                        | SystemCall::NetworkInfoByService(_)
                )
            })
            .count()
    }

    fn record(&self, call: SystemCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SystemNetwork for MockSystemNetwork {
    async fn default_network_interface(&self) -> Result<NetworkInterface, CommandError> {
        self.record(SystemCall::DefaultNetworkInterface);
        if self.fail_discovery == Some(DiscoveryStep::NetworkInterface) {
            return Err(CommandError::InterfaceNotFound);
        }
        Ok(NetworkInterface::new(&self.interface))
    }

    async fn network_service_by_interface(
        &self,
        interface: &NetworkInterface,
    ) -> Result<NetworkService, CommandError> {
        self.record(SystemCall::NetworkServiceByInterface(interface.to_string()));
        if self.fail_discovery == Some(DiscoveryStep::NetworkService) {
            return Err(CommandError::ServiceNotFound {
                interface: interface.to_string(),
            });
        }
        Ok(NetworkService::new(&self.service))
    }

    async fn network_info_by_service(
        &self,
        service: &NetworkService,
    ) -> Result<NetworkInfo, CommandError> {
        self.record(SystemCall::NetworkInfoByService(service.to_string()));
        if self.fail_discovery == Some(DiscoveryStep::NetworkInfo) {
            return Err(CommandError::NetworkInfoNotFound {
                service: service.to_string(),
            });
        }
        Ok(self.info.clone())
    }

    async fn set_network_additional_routes(
        &self,
        network: &Network,
        setups: &[NewNetworkHostSetup],
    ) -> Result<(), CommandError> {
        self.record(SystemCall::SetAdditionalRoutes {
            network: network.name.clone(),
            setups: setups.to_vec(),
        });
        if self.fail_set_routes {
            return Err(failed("networksetup"));
        }
        Ok(())
    }

    async fn list_vpn(&self) -> Result<Vec<VpnService>, CommandError> {
        self.record(SystemCall::ListVpn);
        Ok(self.vpn_services.iter().map(VpnService::new).collect())
    }

    async fn current_vpn(&self) -> Result<VpnService, CommandError> {
        self.record(SystemCall::CurrentVpn);
        if self.fail_current_vpn {
            return Err(failed("scutil"));
        }
        self.active_vpn
            .as_ref()
            .map(VpnService::new)
            .ok_or(CommandError::VpnNotFound)
    }

    async fn open_in_finder(&self, path: &Path) -> Result<(), CommandError> {
        self.record(SystemCall::OpenInFinder(path.to_path_buf()));
        Ok(())
    }
}

/// Resolver answering from a fixed table. Unknown hosts fail to resolve.
#[derive(Debug, Default)]
pub struct StaticResolver {
    answers: HashMap<String, Vec<Ipv4Addr>>,
    lookups: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, ips: &[&str]) -> Self {
        let ips = ips
            .iter()
            .map(|ip| ip.parse().expect("test IPv4 address"))
            .collect();
        self.answers.insert(host.to_string(), ips);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ResolveError> {
        self.lookups.lock().unwrap().push(host.to_string());
        self.answers
            .get(host)
            .cloned()
            .ok_or_else(|| ResolveError::Unresolvable {
                host: host.to_string(),
                reason: "no such host".to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNetworkRepository {
    networks: HashMap<i64, Network>,
}

impl InMemoryNetworkRepository {
    pub fn with(networks: impl IntoIterator<Item = Network>) -> Self {
        Self {
            networks: networks.into_iter().map(|n| (n.id, n)).collect(),
        }
    }
}

#[async_trait]
impl NetworkRepository for InMemoryNetworkRepository {
    async fn get(&self, id: i64) -> Result<Network, StorageError> {
        self.networks
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound {
                entity: "Network",
                id,
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNetworkHostRepository {
    hosts: Vec<NetworkHost>,
}

impl InMemoryNetworkHostRepository {
    pub fn with(hosts: impl IntoIterator<Item = NetworkHost>) -> Self {
        Self {
            hosts: hosts.into_iter().collect(),
        }
    }
}

#[async_trait]
impl NetworkHostRepository for InMemoryNetworkHostRepository {
    async fn list(&self, filter: &NetworkHostFilter) -> Result<Vec<NetworkHost>, StorageError> {
        Ok(self
            .hosts
            .iter()
            .filter(|host| filter.matches(host))
            .cloned()
            .collect())
    }
}

/// Operation seen by [`RecordingUnitOfWork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOp {
    Begin,
    DeleteSetups(Vec<i64>),
    AddSetups(Vec<NewNetworkHostSetup>),
    Commit,
    Rollback,
}

/// Where [`RecordingUnitOfWork`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    DeleteSetups,
    AddSetups,
    Commit,
}

#[derive(Debug, Default)]
struct TxState {
    ops: Vec<TxOp>,
    committed: Vec<NewNetworkHostSetup>,
}

/// Unit of work that logs every operation and keeps the committed setups
#[derive(Debug, Default)]
pub struct RecordingUnitOfWork {
    state: Arc<Mutex<TxState>>,
    fail_at: Option<FailPoint>,
}

impl RecordingUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_committed(self, setups: Vec<NewNetworkHostSetup>) -> Self {
        self.state.lock().unwrap().committed = setups;
        self
    }

    pub fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn ops(&self) -> Vec<TxOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn committed(&self) -> Vec<NewNetworkHostSetup> {
        self.state.lock().unwrap().committed.clone()
    }

    /// Deletes and inserts staged, whether committed or not
    pub fn write_count(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, TxOp::DeleteSetups(_) | TxOp::AddSetups(_)))
            .count()
    }
}

#[async_trait]
impl UnitOfWork for RecordingUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn RouteSetupTransaction>, StorageError> {
        self.state.lock().unwrap().ops.push(TxOp::Begin);
        if self.fail_at == Some(FailPoint::Begin) {
            return Err(storage_failure("begin transaction"));
        }
        Ok(Box::new(RecordingTransaction {
            state: Arc::clone(&self.state),
            fail_at: self.fail_at,
            deleted: Vec::new(),
            added: Vec::new(),
        }))
    }
}

struct RecordingTransaction {
    state: Arc<Mutex<TxState>>,
    fail_at: Option<FailPoint>,
    deleted: Vec<i64>,
    added: Vec<NewNetworkHostSetup>,
}

#[async_trait]
impl RouteSetupTransaction for RecordingTransaction {
    async fn delete_setups_by_network_host_ids(
        &mut self,
        network_host_ids: &[i64],
    ) -> Result<BatchOutcome, StorageError> {
        self.state
            .lock()
            .unwrap()
            .ops
            .push(TxOp::DeleteSetups(network_host_ids.to_vec()));
        if self.fail_at == Some(FailPoint::DeleteSetups) {
            return Err(storage_failure("delete network host setups"));
        }
        self.deleted.extend_from_slice(network_host_ids);
        Ok(BatchOutcome {
            statements: 1,
            rows_affected: 0,
        })
    }

    async fn add_setups(
        &mut self,
        setups: &[NewNetworkHostSetup],
    ) -> Result<BatchOutcome, StorageError> {
        self.state
            .lock()
            .unwrap()
            .ops
            .push(TxOp::AddSetups(setups.to_vec()));
        if self.fail_at == Some(FailPoint::AddSetups) {
            return Err(storage_failure("add network host setups"));
        }
        self.added.extend_from_slice(setups);
        Ok(BatchOutcome {
            statements: 1,
            rows_affected: setups.len() as u64,
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(TxOp::Commit);
        if self.fail_at == Some(FailPoint::Commit) {
            return Err(storage_failure("commit transaction"));
        }
        state
            .committed
            .retain(|setup| !self.deleted.contains(&setup.network_host_id));
        state.committed.extend(self.added.iter().cloned());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        self.state.lock().unwrap().ops.push(TxOp::Rollback);
        Ok(())
    }
}
