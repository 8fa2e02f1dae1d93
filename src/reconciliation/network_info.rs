//! Default network discovery: interface, then service, then mask and router.

use super::errors::{DiscoveryStep, ReconcileError};
use crate::models::NetworkInfo;
use crate::system::SystemNetwork;
use tracing::debug;

/// Run the three-step discovery chain. Failures are terminal; the caller
/// re-invokes once the OS state settles.
pub async fn discover_network_info(
    system: &dyn SystemNetwork,
) -> Result<NetworkInfo, ReconcileError> {
    let interface = system
        .default_network_interface()
        .await
        .map_err(|source| ReconcileError::NetworkInfoUnavailable {
            step: DiscoveryStep::NetworkInterface,
            source,
        })?;

    let service = system
        .network_service_by_interface(&interface)
        .await
        .map_err(|source| ReconcileError::NetworkInfoUnavailable {
            step: DiscoveryStep::NetworkService,
            source,
        })?;

    let info = system
        .network_info_by_service(&service)
        .await
        .map_err(|source| ReconcileError::NetworkInfoUnavailable {
            step: DiscoveryStep::NetworkInfo,
            source,
        })?;

    debug!(
        interface = %interface,
        service = %service,
        subnet_mask = %info.subnet_mask,
        router = %info.router,
        "Discovered default network"
    );
    Ok(info)
}
