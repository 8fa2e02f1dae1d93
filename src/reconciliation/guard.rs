//! Active-network gate shared by sync and reset.

use super::errors::ReconcileError;
use crate::models::{Network, VpnService};
use crate::system::SystemNetwork;

/// What the OS reported when a network asked to mutate routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The network is the connected VPN and may change routes
    Active(VpnService),
    /// No L2TP service is connected
    NoVpn,
    /// A different VPN is connected
    OtherVpn(VpnService),
}

impl Activation {
    pub fn is_active(&self) -> bool {
        matches!(self, Activation::Active(_))
    }
}

/// Ask the OS which VPN is connected and compare it with `network`.
///
/// Only the currently connected network may touch the additional-routes
/// table, which makes this the mutual exclusion between networks. "No VPN"
/// is an outcome, not an error; any other command failure is.
pub async fn ensure_network_active(
    system: &dyn SystemNetwork,
    network: &Network,
) -> Result<Activation, ReconcileError> {
    match system.current_vpn().await {
        Ok(vpn) if network.is_active_for(vpn.as_str()) => Ok(Activation::Active(vpn)),
        Ok(vpn) => Ok(Activation::OtherVpn(vpn)),
        Err(err) if err.is_vpn_not_found() => Ok(Activation::NoVpn),
        Err(err) => Err(ReconcileError::Command(err)),
    }
}
