// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use route_calendar::config::Config;
use route_calendar::db::{LocalStore, MemoryStore, RemoteStore};
use route_calendar::routes::create_router;
use route_calendar::services::{RouteCatalog, SyncEngine, SyncHandle};
use route_calendar::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Check if the Firebase emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIREBASE_EMULATOR_URL").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIREBASE_EMULATOR_URL not set");
            return;
        }
    };
}

/// Two routes, two users, nothing assigned.
#[allow(dead_code)]
pub fn test_catalog() -> Arc<RouteCatalog> {
    let catalog = RouteCatalog::load_from_json(
        &json!({
            "users": ["Alice", "Bob"],
            "goal_miles": 100,
            "routes": [
                {"route": "A", "map": "Watopia", "length_miles": 20, "elevation": "150m (492')"},
                {"route": "B", "map": "London", "length_miles": "12.5", "elevation": "80m (262')",
                 "users": {"Alice": true, "Bob": false}}
            ]
        })
        .to_string(),
    )
    .expect("test catalog should load");
    Arc::new(catalog)
}

/// Snapshot record for the two-route test catalog.
#[allow(dead_code)]
pub fn record(first: Value, second: Value) -> Value {
    json!({"routes": [{"users": first}, {"users": second}]})
}

/// A running engine with its stores. Keep `dir` alive for the local slot.
#[allow(dead_code)]
pub struct TestEngine {
    pub sync: SyncHandle,
    pub remote: Option<MemoryStore>,
    pub local: LocalStore,
    pub dir: TempDir,
}

/// Start an engine against an optional in-memory remote store.
#[allow(dead_code)]
pub async fn start_engine(remote: Option<MemoryStore>) -> TestEngine {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::new(dir.path().join("state.json"));
    start_engine_with_local(remote, local, dir).await
}

/// Spawn an engine without waiting for its initial load.
#[allow(dead_code)]
pub fn spawn_engine(remote: Option<MemoryStore>) -> TestEngine {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::new(dir.path().join("state.json"));
    spawn_engine_with_local(remote, local, dir)
}

fn spawn_engine_with_local(
    remote: Option<MemoryStore>,
    local: LocalStore,
    dir: TempDir,
) -> TestEngine {
    let sync = SyncEngine::new(
        test_catalog(),
        local.clone(),
        remote.clone().map(RemoteStore::Memory),
    )
    .with_resubscribe_delay(Duration::from_millis(20))
    .spawn();

    TestEngine {
        sync,
        remote,
        local,
        dir,
    }
}

/// Start an engine with a pre-populated local slot.
#[allow(dead_code)]
pub async fn start_engine_with_local(
    remote: Option<MemoryStore>,
    local: LocalStore,
    dir: TempDir,
) -> TestEngine {
    let engine = spawn_engine_with_local(remote, local, dir);

    tokio::time::timeout(Duration::from_secs(5), engine.sync.wait_until_ready())
        .await
        .expect("engine should become ready")
        .expect("engine should be running");

    engine
}

/// Create a test app backed by an in-memory remote store.
/// Returns the router, the shared state and the engine's stores.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, TestEngine) {
    let engine = start_engine(Some(MemoryStore::new())).await;
    let state = Arc::new(AppState {
        config: Config::test_default(),
        catalog: test_catalog(),
        sync: engine.sync.clone(),
    });

    (create_router(state.clone()), state, engine)
}

/// Wait for a condition on the published view, failing after a timeout.
#[allow(dead_code)]
pub async fn wait_for(
    sync: &SyncHandle,
    predicate: impl FnMut(&route_calendar::services::ModelView) -> bool,
) -> Arc<route_calendar::services::ModelView> {
    tokio::time::timeout(Duration::from_secs(5), sync.wait_for(predicate))
        .await
        .expect("condition not reached in time")
        .expect("engine should be running")
}
