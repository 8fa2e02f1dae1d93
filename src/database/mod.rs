//! # Database Operations
//!
//! SQLite connection management for the network, host and route setup tables.
//!
//! - [`connection`] - Pool construction, migrations and health checks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use splitroute::config::DatabaseConfig;
//! use splitroute::database::DatabaseConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::connect(&DatabaseConfig::default()).await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```

pub mod connection;

pub use connection::DatabaseConnection;
