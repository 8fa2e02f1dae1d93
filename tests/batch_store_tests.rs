//! Chunked setup writes against an in-memory SQLite database.

mod common;

use common::*;
use splitroute::models::{NetworkHost, NetworkHostSetup, NewNetworkHostSetup};

fn setups_for(host_id: i64, count: usize) -> Vec<NewNetworkHostSetup> {
    (0..count)
        .map(|i| {
            let ip = format!("10.0.{}.{}", i / 250, i % 250 + 1);
            setup(host_id, &ip, "255.255.255.0", "10.0.0.1")
        })
        .collect()
}

#[tokio::test]
async fn test_add_batch_splits_into_chunks() {
    let db = test_database().await;
    let network = create_network(db.pool(), "Office").await;
    let host = create_host(db.pool(), network.id, "build.internal").await;

    let mut tx = db.pool().begin().await.unwrap();
    let outcome = NetworkHostSetup::add_batch(&mut tx, &setups_for(host.id, 25), 10)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcome.statements, 3);
    assert_eq!(outcome.rows_affected, 25);
    assert_eq!(count_setups(db.pool()).await, 25);
}

#[tokio::test]
async fn test_empty_batches_issue_no_statements() {
    let db = test_database().await;

    let mut conn = db.pool().acquire().await.unwrap();
    let added = NetworkHostSetup::add_batch(&mut conn, &[], 10).await.unwrap();
    let deleted = NetworkHostSetup::delete_batch_by_network_host_ids(&mut conn, &[], 10)
        .await
        .unwrap();

    assert_eq!(added.statements, 0);
    assert_eq!(added.rows_affected, 0);
    assert_eq!(deleted.statements, 0);
}

#[tokio::test]
async fn test_rows_in_a_chunk_share_created_at() {
    let db = test_database().await;
    let network = create_network(db.pool(), "Office").await;
    let host = create_host(db.pool(), network.id, "build.internal").await;

    let mut tx = db.pool().begin().await.unwrap();
    NetworkHostSetup::add_batch(&mut tx, &setups_for(host.id, 5), 100)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let rows = NetworkHostSetup::list_by_network_host_ids(db.pool(), &[host.id])
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.created_at == rows[0].created_at));
}

#[tokio::test]
async fn test_delete_batch_by_host_ids_in_chunks() {
    let db = test_database().await;
    let network = create_network(db.pool(), "Office").await;

    let mut hosts: Vec<NetworkHost> = Vec::new();
    for i in 0..7 {
        hosts.push(create_host(db.pool(), network.id, &format!("host-{i}.internal")).await);
    }
    let rows: Vec<NewNetworkHostSetup> = hosts
        .iter()
        .flat_map(|host| setups_for(host.id, 2))
        .collect();

    let mut tx = db.pool().begin().await.unwrap();
    NetworkHostSetup::add_batch(&mut tx, &rows, 100).await.unwrap();

    let doomed: Vec<i64> = hosts[..5].iter().map(|host| host.id).collect();
    let outcome = NetworkHostSetup::delete_batch_by_network_host_ids(&mut tx, &doomed, 2)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcome.statements, 3);
    assert_eq!(outcome.rows_affected, 10);

    let remaining = NetworkHostSetup::list_by_network(db.pool(), network.id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining
        .iter()
        .all(|row| row.network_host_id == hosts[5].id || row.network_host_id == hosts[6].id));
}

#[tokio::test]
async fn test_uncommitted_batch_is_discarded() {
    let db = test_database().await;
    let network = create_network(db.pool(), "Office").await;
    let host = create_host(db.pool(), network.id, "build.internal").await;

    {
        let mut tx = db.pool().begin().await.unwrap();
        NetworkHostSetup::add_batch(&mut tx, &setups_for(host.id, 3), 100)
            .await
            .unwrap();
        tx.rollback().await.unwrap();
    }

    assert_eq!(count_setups(db.pool()).await, 0);
}

#[tokio::test]
async fn test_deleting_host_cascades_to_setups() {
    let db = test_database().await;
    let network = create_network(db.pool(), "Office").await;
    let kept = create_host(db.pool(), network.id, "kept.internal").await;
    let removed = create_host(db.pool(), network.id, "removed.internal").await;

    let mut rows = setups_for(kept.id, 2);
    rows.extend(setups_for(removed.id, 3));
    let mut tx = db.pool().begin().await.unwrap();
    NetworkHostSetup::add_batch(&mut tx, &rows, 100).await.unwrap();
    tx.commit().await.unwrap();

    assert!(NetworkHost::delete(db.pool(), removed.id).await.unwrap());
    assert_eq!(count_setups(db.pool()).await, 2);

    assert!(splitroute::models::Network::delete(db.pool(), network.id)
        .await
        .unwrap());
    assert_eq!(count_setups(db.pool()).await, 0);
}
