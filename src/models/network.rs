//! # Network Model
//!
//! A user-defined group of hosts. A network is "active" exactly when its name
//! equals the name of the currently connected L2TP VPN.
//!
//! ## Database Schema
//!
//! Maps to the `networks` table:
//! ```sql
//! CREATE TABLE networks (
//!   id INTEGER PRIMARY KEY AUTOINCREMENT,
//!   name TEXT NOT NULL UNIQUE,
//!   created_at TIMESTAMP NOT NULL
//! );
//! ```
//!
//! Deleting a network cascades to its hosts and, through them, to their
//! resolved setup rows.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Network {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// New Network for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNetwork {
    pub name: String,
}

impl Network {
    /// Create a new network
    pub async fn create(pool: &SqlitePool, new_network: NewNetwork) -> Result<Network, sqlx::Error> {
        sqlx::query_as::<_, Network>(
            r#"
            INSERT INTO networks (name, created_at)
            VALUES (?1, ?2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(new_network.name)
        .bind(Utc::now().naive_utc())
        .fetch_one(pool)
        .await
    }

    /// Find a network by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Network>, sqlx::Error> {
        sqlx::query_as::<_, Network>(
            r#"
            SELECT id, name, created_at
            FROM networks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find a network by its exact name
    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<Network>, sqlx::Error> {
        sqlx::query_as::<_, Network>(
            r#"
            SELECT id, name, created_at
            FROM networks
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// List all networks ordered by name
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Network>, sqlx::Error> {
        sqlx::query_as::<_, Network>(
            r#"
            SELECT id, name, created_at
            FROM networks
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a network and, by cascade, its hosts and setups
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM networks WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether this network is the one the OS reports as connected
    pub fn is_active_for(&self, active_vpn_name: &str) -> bool {
        self.name == active_vpn_name
    }
}
