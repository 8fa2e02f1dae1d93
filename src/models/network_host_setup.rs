//! # Network Host Setup Model
//!
//! One row per resolved IPv4 address of a [`NetworkHost`](super::NetworkHost),
//! carrying a snapshot of the subnet mask and router that were current when the
//! network was last synced.
//!
//! ## Database Schema
//!
//! Maps to the `network_host_setups` table:
//! ```sql
//! CREATE TABLE network_host_setups (
//!   id INTEGER PRIMARY KEY AUTOINCREMENT,
//!   network_host_id INTEGER NOT NULL REFERENCES network_hosts(id) ON DELETE CASCADE,
//!   network_host_ip TEXT NOT NULL,
//!   subnet_mask TEXT NOT NULL,
//!   router TEXT NOT NULL,
//!   created_at TIMESTAMP NOT NULL
//! );
//! ```
//!
//! ## Batch Operations
//!
//! Rows are never patched. A sync deletes every row of the affected hosts and
//! inserts the freshly computed set. Both directions are chunked so a single
//! statement never exceeds SQLite's bind parameter limit:
//!
//! - [`NetworkHostSetup::add_batch`] issues one multi-row `INSERT` per chunk
//! - [`NetworkHostSetup::delete_batch_by_network_host_ids`] issues one
//!   `DELETE ... WHERE network_host_id IN (...)` per chunk
//!
//! Neither opens a transaction. They run on whatever connection the caller
//! hands in, normally an open [`sqlx::Transaction`].

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NetworkHostSetup {
    pub id: i64,
    pub network_host_id: i64,
    pub network_host_ip: String,
    pub subnet_mask: String,
    pub router: String,
    pub created_at: NaiveDateTime,
}

/// Desired route row, computed by a sync before it is persisted.
///
/// Also the unit handed to `networksetup -setadditionalroutes`: each value
/// becomes the `ip mask router` argument triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNetworkHostSetup {
    pub network_host_id: i64,
    pub network_host_ip: String,
    pub subnet_mask: String,
    pub router: String,
}

/// Statements issued and rows touched by a batch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub statements: usize,
    pub rows_affected: u64,
}

impl NetworkHostSetup {
    /// Insert `rows` in chunks of `chunk_size`.
    ///
    /// All rows of one chunk share the `created_at` captured when that chunk is
    /// built. Empty input issues no statement.
    pub async fn add_batch(
        conn: &mut SqliteConnection,
        rows: &[NewNetworkHostSetup],
        chunk_size: usize,
    ) -> Result<BatchOutcome, sqlx::Error> {
        let mut outcome = BatchOutcome::default();

        for chunk in rows.chunks(chunk_size.max(1)) {
            let created_at = Utc::now().naive_utc();
            let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
                "INSERT INTO network_host_setups \
                 (network_host_id, network_host_ip, subnet_mask, router, created_at) ",
            );
            query.push_values(chunk, |mut row, setup| {
                row.push_bind(setup.network_host_id)
                    .push_bind(setup.network_host_ip.clone())
                    .push_bind(setup.subnet_mask.clone())
                    .push_bind(setup.router.clone())
                    .push_bind(created_at);
            });

            let result = query.build().execute(&mut *conn).await?;
            outcome.statements += 1;
            outcome.rows_affected += result.rows_affected();
        }

        debug!(
            rows = rows.len(),
            statements = outcome.statements,
            "Inserted network host setups"
        );
        Ok(outcome)
    }

    /// Delete every setup row belonging to `network_host_ids`, in chunks of
    /// `chunk_size` ids. Empty input issues no statement.
    pub async fn delete_batch_by_network_host_ids(
        conn: &mut SqliteConnection,
        network_host_ids: &[i64],
        chunk_size: usize,
    ) -> Result<BatchOutcome, sqlx::Error> {
        let mut outcome = BatchOutcome::default();

        for chunk in network_host_ids.chunks(chunk_size.max(1)) {
            let mut query: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("DELETE FROM network_host_setups WHERE network_host_id IN (");
            let mut ids = query.separated(", ");
            for id in chunk {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");

            let result = query.build().execute(&mut *conn).await?;
            outcome.statements += 1;
            outcome.rows_affected += result.rows_affected();
        }

        debug!(
            host_ids = network_host_ids.len(),
            statements = outcome.statements,
            rows_deleted = outcome.rows_affected,
            "Deleted network host setups"
        );
        Ok(outcome)
    }

    /// List setups for the given hosts, ordered by id
    pub async fn list_by_network_host_ids(
        pool: &SqlitePool,
        network_host_ids: &[i64],
    ) -> Result<Vec<NetworkHostSetup>, sqlx::Error> {
        if network_host_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, network_host_id, network_host_ip, subnet_mask, router, created_at \
             FROM network_host_setups WHERE network_host_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in network_host_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY id");

        query.build_query_as::<NetworkHostSetup>().fetch_all(pool).await
    }

    /// List every setup persisted for a network's hosts
    pub async fn list_by_network(
        pool: &SqlitePool,
        network_id: i64,
    ) -> Result<Vec<NetworkHostSetup>, sqlx::Error> {
        sqlx::query_as::<_, NetworkHostSetup>(
            r#"
            SELECT s.id, s.network_host_id, s.network_host_ip, s.subnet_mask, s.router, s.created_at
            FROM network_host_setups s
            INNER JOIN network_hosts h ON h.id = s.network_host_id
            WHERE h.network_id = ?1
            ORDER BY s.id
            "#,
        )
        .bind(network_id)
        .fetch_all(pool)
        .await
    }
}

impl From<&NetworkHostSetup> for NewNetworkHostSetup {
    fn from(setup: &NetworkHostSetup) -> Self {
        Self {
            network_host_id: setup.network_host_id,
            network_host_ip: setup.network_host_ip.clone(),
            subnet_mask: setup.subnet_mask.clone(),
            router: setup.router.clone(),
        }
    }
}
