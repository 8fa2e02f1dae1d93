//! # Route Reconciliation
//!
//! Computes the additional routes a network should have and applies them
//! when, and only when, that network is the connected VPN.
//!
//! - [`reconciler`] - [`RouteReconciler`] with the sync and reset use cases
//! - [`guard`] - active-network check shared by both use cases
//! - [`network_info`] - interface -> service -> mask/router discovery
//! - [`errors`] - [`ReconcileError`] and the step enums it carries

pub mod errors;
pub mod guard;
pub mod network_info;
pub mod reconciler;

pub use errors::{ApplyFailure, ApplyStep, DiscoveryStep, ReconcileError};
pub use guard::{ensure_network_active, Activation};
pub use network_info::discover_network_info;
pub use reconciler::{ReconcileOutcome, RouteReconciler};
