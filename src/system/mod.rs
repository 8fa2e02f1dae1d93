//! # macOS Network System Access
//!
//! Everything the route engine learns about or changes in the OS goes through
//! the [`SystemNetwork`] trait. The production implementation,
//! [`CommandExecutor`], shells out to `route`, `networksetup`, `scutil` and
//! `open`, one process per call, and extracts values from their output with
//! the line parsers in [`parser`].
//!
//! ## Discovery Chain
//!
//! The subnet mask and router of the current default network are found in
//! three steps, each feeding the next:
//!
//! 1. `route get default` gives the default interface (`en0`)
//! 2. `networksetup -listnetworkserviceorder` maps it to a service (`Wi-Fi`)
//! 3. `networksetup -getinfo <service>` gives `Subnet mask:` and `Router:`

pub mod errors;
pub mod executor;
pub mod parser;
pub mod runner;

pub use errors::CommandError;
pub use executor::CommandExecutor;
pub use runner::{CommandRunner, ProcessRunner};

use crate::models::{
    Network, NetworkInfo, NetworkInterface, NetworkService, NewNetworkHostSetup, VpnService,
};
use async_trait::async_trait;
use std::path::Path;

/// OS queries and mutations used by route reconciliation and the CLI.
#[async_trait]
pub trait SystemNetwork: Send + Sync {
    async fn default_network_interface(&self) -> Result<NetworkInterface, CommandError>;

    async fn network_service_by_interface(
        &self,
        interface: &NetworkInterface,
    ) -> Result<NetworkService, CommandError>;

    async fn network_info_by_service(
        &self,
        service: &NetworkService,
    ) -> Result<NetworkInfo, CommandError>;

    /// Replace the additional routes of the service named after `network`.
    /// An empty slice clears them.
    async fn set_network_additional_routes(
        &self,
        network: &Network,
        setups: &[NewNetworkHostSetup],
    ) -> Result<(), CommandError>;

    async fn list_vpn(&self) -> Result<Vec<VpnService>, CommandError>;

    /// The connected L2TP service, or [`CommandError::VpnNotFound`].
    async fn current_vpn(&self) -> Result<VpnService, CommandError>;

    async fn open_in_finder(&self, path: &Path) -> Result<(), CommandError>;
}
