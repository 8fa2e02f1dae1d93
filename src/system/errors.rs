//! # System Command Error Types
//!
//! Failures from running the macOS networking tools or from finding nothing
//! usable in their output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Default network interface not found")]
    InterfaceNotFound,

    #[error("Network service not found for interface {interface}")]
    ServiceNotFound { interface: String },

    #[error("Network info not found for service {service}")]
    NetworkInfoNotFound { service: String },

    /// No L2TP service is currently connected.
    ///
    /// Callers treat this as "nothing to do" rather than a failure.
    #[error("VPN not found")]
    VpnNotFound,
}

impl CommandError {
    pub fn is_vpn_not_found(&self) -> bool {
        matches!(self, CommandError::VpnNotFound)
    }
}
