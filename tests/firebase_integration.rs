// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Realtime Database integration tests.
//!
//! These tests require the Firebase emulator to be running, with
//! FIREBASE_EMULATOR_URL pointing at its database endpoint.
//!
//! Each test writes to its own record so runs do not interfere.

use futures_util::StreamExt;
use route_calendar::db::FirebaseClient;
use route_calendar::services::ingest_record;
use serde_json::json;
use std::time::Duration;

mod common;

/// Client for a record unique to this test run.
fn test_client(name: &str) -> FirebaseClient {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let url = std::env::var("FIREBASE_EMULATOR_URL").unwrap();
    FirebaseClient::new(&url, &format!("test/{}-{}", name, nanos), None)
}

#[tokio::test]
async fn test_put_fetch_remove() {
    require_emulator!();

    let client = test_client("put-fetch");
    assert_eq!(client.fetch().await.unwrap(), None);

    let record = json!({"routes": [{"users": {"Alice": "2025-12-10"}}]});
    client.put(&record).await.unwrap();

    // Arrays come back from the database as arrays or keyed objects;
    // either way ingest must recover the same snapshot.
    let fetched = client.fetch().await.unwrap().unwrap();
    assert_eq!(
        ingest_record(fetched).unwrap(),
        ingest_record(record).unwrap()
    );

    client.remove().await.unwrap();
    assert_eq!(client.fetch().await.unwrap(), None);
}

#[tokio::test]
async fn test_subscription_delivers_later_writes() {
    require_emulator!();

    let client = test_client("subscribe");
    client
        .put(&json!({"routes": [{"users": {}}]}))
        .await
        .unwrap();

    let mut changes = client.subscribe().await.unwrap();
    // Let the initial snapshot event arrive before writing
    tokio::time::sleep(Duration::from_millis(500)).await;

    let writer = client.clone();
    writer
        .put(&json!({"routes": {"0": {"users": {"Bob": "2025-12-12"}}}}))
        .await
        .unwrap();

    let change = tokio::time::timeout(Duration::from_secs(10), changes.next())
        .await
        .expect("no change within timeout")
        .expect("stream ended")
        .expect("stream error");
    let snapshot = ingest_record(change.unwrap()).unwrap();
    assert_eq!(
        snapshot.routes[0].users.get("Bob"),
        Some(&Some("2025-12-12".to_string()))
    );

    client.remove().await.unwrap();
}
