//! # Error Types
//!
//! Crate-level error aggregating the per-layer error enums.

use thiserror::Error;

pub use crate::config::ConfigurationError;
pub use crate::reconciliation::ReconcileError;
pub use crate::resolver::ResolveError;
pub use crate::services::HostManagementError;
pub use crate::storage::StorageError;
pub use crate::system::CommandError;

#[derive(Error, Debug)]
pub enum SplitRouteError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Route sync failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    HostManagement(#[from] HostManagementError),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, SplitRouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(network_id: i64) -> Result<()> {
        let failed: std::result::Result<(), ReconcileError> =
            Err(ReconcileError::NetworkNotFound { network_id });
        failed?;
        Ok(())
    }

    #[test]
    fn test_layer_errors_convert() {
        let err = reconcile(7).unwrap_err();
        assert!(matches!(
            err,
            SplitRouteError::Reconcile(ReconcileError::NetworkNotFound { network_id: 7 })
        ));
        assert_eq!(err.to_string(), "Route sync failed: Network not found: 7");

        let err: SplitRouteError = CommandError::VpnNotFound.into();
        assert_eq!(err.to_string(), "VPN not found");
    }
}
