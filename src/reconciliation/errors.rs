//! # Reconciliation Error Types
//!
//! Every failure a sync or reset can return. "No VPN connected" and "network
//! is not the active VPN" are not errors; they end the call with `Ok(())`.

use crate::resolver::ResolveError;
use crate::storage::StorageError;
use crate::system::CommandError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Link of the interface -> service -> info discovery chain that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStep {
    NetworkInterface,
    NetworkService,
    NetworkInfo,
}

impl fmt::Display for DiscoveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStep::NetworkInterface => write!(f, "default network interface"),
            DiscoveryStep::NetworkService => write!(f, "network service"),
            DiscoveryStep::NetworkInfo => write!(f, "network info"),
        }
    }
}

/// Sub-step of the transactional apply that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStep {
    Begin,
    DeleteSetups,
    AddSetups,
    SetAdditionalRoutes,
}

impl fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyStep::Begin => write!(f, "begin transaction"),
            ApplyStep::DeleteSetups => write!(f, "delete network host setups"),
            ApplyStep::AddSetups => write!(f, "add network host setups"),
            ApplyStep::SetAdditionalRoutes => write!(f, "set additional routes"),
        }
    }
}

/// Underlying cause of a failed apply step
#[derive(Error, Debug)]
pub enum ApplyFailure {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Network not found: {network_id}")]
    NetworkNotFound { network_id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to resolve host {address}: {source}")]
    DnsResolution {
        address: String,
        #[source]
        source: ResolveError,
    },

    #[error("Host {address} did not resolve to any IPv4 address")]
    NoIpv4Address { address: String },

    #[error("Network info unavailable, could not get {step}: {source}")]
    NetworkInfoUnavailable {
        step: DiscoveryStep,
        #[source]
        source: CommandError,
    },

    #[error("OS command failed: {0}")]
    Command(#[from] CommandError),

    #[error("Failed to apply routes, could not {step}: {source}")]
    TransactionApply {
        step: ApplyStep,
        #[source]
        source: ApplyFailure,
    },

    /// The OS route table was updated but the matching rows were not
    /// committed, so persisted setups and live routes disagree until the next
    /// successful sync.
    #[error("Routes applied for network {network} but storage commit failed: {source}")]
    RoutesAppliedCommitFailed {
        network: String,
        #[source]
        source: StorageError,
    },
}

impl ReconcileError {
    pub(crate) fn apply(step: ApplyStep, source: impl Into<ApplyFailure>) -> Self {
        ReconcileError::TransactionApply {
            step,
            source: source.into(),
        }
    }

    /// Step of the transactional apply that failed, if any
    pub fn apply_step(&self) -> Option<ApplyStep> {
        match self {
            ReconcileError::TransactionApply { step, .. } => Some(*step),
            _ => None,
        }
    }
}
