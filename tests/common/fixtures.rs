//! Reconciler wired to the in-memory doubles.

#![allow(dead_code)]

use std::sync::Arc;

use splitroute::models::{Network, NetworkHost};
use splitroute::reconciliation::RouteReconciler;

use super::mocks::{
    InMemoryNetworkHostRepository, InMemoryNetworkRepository, MockSystemNetwork,
    RecordingUnitOfWork, StaticResolver,
};

pub struct Harness {
    pub reconciler: RouteReconciler,
    pub system: Arc<MockSystemNetwork>,
    pub resolver: Arc<StaticResolver>,
    pub unit_of_work: Arc<RecordingUnitOfWork>,
}

pub struct HarnessBuilder {
    networks: Vec<Network>,
    hosts: Vec<NetworkHost>,
    system: MockSystemNetwork,
    resolver: StaticResolver,
    unit_of_work: RecordingUnitOfWork,
}

impl HarnessBuilder {
    pub fn new(system: MockSystemNetwork) -> Self {
        Self {
            networks: Vec::new(),
            hosts: Vec::new(),
            system,
            resolver: StaticResolver::new(),
            unit_of_work: RecordingUnitOfWork::new(),
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.networks.push(network);
        self
    }

    pub fn with_host(mut self, host: NetworkHost) -> Self {
        self.hosts.push(host);
        self
    }

    pub fn with_resolver(mut self, resolver: StaticResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_unit_of_work(mut self, unit_of_work: RecordingUnitOfWork) -> Self {
        self.unit_of_work = unit_of_work;
        self
    }

    pub fn build(self) -> Harness {
        let system = Arc::new(self.system);
        let resolver = Arc::new(self.resolver);
        let unit_of_work = Arc::new(self.unit_of_work);

        let reconciler = RouteReconciler::new(
            Arc::new(InMemoryNetworkRepository::with(self.networks)),
            Arc::new(InMemoryNetworkHostRepository::with(self.hosts)),
            unit_of_work.clone(),
            system.clone(),
            resolver.clone(),
        );

        Harness {
            reconciler,
            system,
            resolver,
            unit_of_work,
        }
    }
}
