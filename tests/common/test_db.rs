//! In-memory SQLite helpers for storage-backed tests.

#![allow(dead_code)]

use splitroute::database::DatabaseConnection;
use splitroute::models::{Network, NetworkHost, NewNetwork, NewNetworkHost};
use sqlx::SqlitePool;

/// Fresh migrated in-memory database
pub async fn test_database() -> DatabaseConnection {
    DatabaseConnection::in_memory()
        .await
        .expect("in-memory database")
}

pub async fn create_network(pool: &SqlitePool, name: &str) -> Network {
    Network::create(
        pool,
        NewNetwork {
            name: name.to_string(),
        },
    )
    .await
    .expect("create network")
}

pub async fn create_host(pool: &SqlitePool, network_id: i64, address: &str) -> NetworkHost {
    NetworkHost::create_if_absent(
        pool,
        NewNetworkHost {
            network_id,
            address: address.to_string(),
            description: None,
        },
    )
    .await
    .expect("create host")
    .expect("host was not already present")
}

pub async fn count_setups(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM network_host_setups")
        .fetch_one(pool)
        .await
        .expect("count setups")
}
