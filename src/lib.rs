#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, macOS in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Splitroute
//!
//! Split-tunnel VPN routing for macOS.
//!
//! ## Overview
//!
//! A user declares named networks, each matched by name against the connected
//! L2TP VPN service, and a set of hosts per network that should be routed
//! through that VPN. Everything else keeps using the default route.
//!
//! The core is the route reconciliation engine. For one network it discovers
//! the subnet mask and router of the default interface, resolves every host
//! to IPv4 addresses, persists the resulting setups and pushes them to the OS
//! as additional routes of the VPN service. Nothing is changed unless the
//! network is the VPN that is connected right now.
//!
//! ## Module Organization
//!
//! - [`system`] - OS commands (`route`, `networksetup`, `scutil`, `open`) and their output parsers
//! - [`reconciliation`] - Sync and reset use cases
//! - [`storage`] - Repository and unit-of-work traits with SQLite implementations
//! - [`models`] - Networks, hosts and route setups
//! - [`database`] - SQLite connection management and migrations
//! - [`resolver`] - IPv4 host resolution
//! - [`services`] - Host and network management that triggers syncs
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging
//! - [`error`] - Crate-level error
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splitroute::config::ConfigManager;
//! use splitroute::database::DatabaseConnection;
//! use splitroute::reconciliation::RouteReconciler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let db = DatabaseConnection::connect(&manager.config().database).await?;
//!
//! let reconciler = RouteReconciler::from_pool(db.pool().clone(), &manager.config().storage);
//! let outcome = reconciler.sync_by_network_id(1).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! OS access, DNS and storage all sit behind traits, so the reconciliation
//! tests run against in-memory doubles and an in-memory SQLite database:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod reconciliation;
pub mod resolver;
pub mod services;
pub mod storage;
pub mod system;

pub use config::{ConfigManager, DatabaseConfig, SplitRouteConfig, StorageConfig};
pub use database::DatabaseConnection;
pub use error::{Result, SplitRouteError};
pub use models::{
    Network, NetworkHost, NetworkHostSetup, NetworkInfo, NetworkInterface, NetworkService,
    NewNetworkHostSetup, VpnService,
};
pub use reconciliation::{ReconcileError, ReconcileOutcome, RouteReconciler};
pub use resolver::{HostResolver, SystemResolver};
pub use services::HostManagementService;
pub use system::{CommandExecutor, SystemNetwork};
