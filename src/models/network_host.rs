//! # Network Host Model
//!
//! A hostname or literal address that should be routed through a network's VPN.
//!
//! ## Database Schema
//!
//! Maps to the `network_hosts` table:
//! ```sql
//! CREATE TABLE network_hosts (
//!   id INTEGER PRIMARY KEY AUTOINCREMENT,
//!   network_id INTEGER NOT NULL REFERENCES networks(id) ON DELETE CASCADE,
//!   address TEXT NOT NULL,
//!   description TEXT,
//!   created_at TIMESTAMP NOT NULL,
//!   UNIQUE(network_id, address)
//! );
//! ```
//!
//! Inserting an address that already exists for the network is a silent skip,
//! so concurrent adds of the same host never fail.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NetworkHost {
    pub id: i64,
    pub network_id: i64,
    pub address: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// New NetworkHost for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNetworkHost {
    pub network_id: i64,
    pub address: String,
    pub description: Option<String>,
}

/// Optional conditions for listing hosts; unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkHostFilter {
    pub network_id: Option<i64>,
    pub address: Option<String>,
}

impl NetworkHostFilter {
    pub fn for_network(network_id: i64) -> Self {
        Self {
            network_id: Some(network_id),
            ..Default::default()
        }
    }

    /// In-memory equivalent of the SQL conditions built by [`NetworkHost::list`]
    pub fn matches(&self, host: &NetworkHost) -> bool {
        self.network_id.map_or(true, |id| host.network_id == id)
            && self
                .address
                .as_deref()
                .map_or(true, |address| host.address == address)
    }
}

impl NetworkHost {
    /// Insert a host unless (network_id, address) already exists.
    ///
    /// Returns `None` when the host was already present.
    pub async fn create_if_absent(
        pool: &SqlitePool,
        new_host: NewNetworkHost,
    ) -> Result<Option<NetworkHost>, sqlx::Error> {
        sqlx::query_as::<_, NetworkHost>(
            r#"
            INSERT INTO network_hosts (network_id, address, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (network_id, address) DO NOTHING
            RETURNING id, network_id, address, description, created_at
            "#,
        )
        .bind(new_host.network_id)
        .bind(new_host.address)
        .bind(new_host.description)
        .bind(Utc::now().naive_utc())
        .fetch_optional(pool)
        .await
    }

    /// Find a host by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<NetworkHost>, sqlx::Error> {
        sqlx::query_as::<_, NetworkHost>(
            r#"
            SELECT id, network_id, address, description, created_at
            FROM network_hosts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List hosts matching the filter, ordered by insertion
    pub async fn list(
        pool: &SqlitePool,
        filter: &NetworkHostFilter,
    ) -> Result<Vec<NetworkHost>, sqlx::Error> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, network_id, address, description, created_at FROM network_hosts WHERE 1 = 1",
        );

        if let Some(network_id) = filter.network_id {
            query.push(" AND network_id = ").push_bind(network_id);
        }
        if let Some(address) = &filter.address {
            query.push(" AND address = ").push_bind(address.clone());
        }
        query.push(" ORDER BY id");

        query.build_query_as::<NetworkHost>().fetch_all(pool).await
    }

    /// Delete a host; its setup rows go with it through the FK cascade
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM network_hosts WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
