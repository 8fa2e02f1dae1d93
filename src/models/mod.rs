//! # Data Layer
//!
//! SQLite-backed models for networks, their hosts, and the resolved route rows
//! derived from those hosts, plus the value types reported by the OS tools.
//!
//! - [`network`] - user-defined groups matched against the connected VPN name
//! - [`network_host`] - hostnames or literal addresses routed through a network
//! - [`network_host_setup`] - one row per resolved IPv4 address, with chunked batch writes
//! - [`system_network`] - interface, service, network info and VPN service values

pub mod network;
pub mod network_host;
pub mod network_host_setup;
pub mod system_network;

pub use network::{Network, NewNetwork};
pub use network_host::{NetworkHost, NetworkHostFilter, NewNetworkHost};
pub use network_host_setup::{BatchOutcome, NetworkHostSetup, NewNetworkHostSetup};
pub use system_network::{NetworkInfo, NetworkInterface, NetworkService, VpnService};
