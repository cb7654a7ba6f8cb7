// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route Calendar API Server
//!
//! Serves the shared ride calendar and keeps assignments in sync with the
//! Firebase Realtime Database when one is configured.

use route_calendar::{
    config::Config,
    db::{FirebaseClient, LocalStore, RemoteStore},
    services::{RouteCatalog, SyncEngine},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Route Calendar API");

    // Load route catalog
    tracing::info!(path = %config.catalog_path, "Loading route catalog");
    let catalog =
        Arc::new(RouteCatalog::load_from_file(&config.catalog_path).expect("Failed to load route catalog"));

    let local = LocalStore::new(&config.local_store_path);
    let remote = config.firebase_database_url.as_deref().map(|url| {
        tracing::info!(url, record = %config.sync_record, "Firebase sync enabled");
        RemoteStore::Firebase(FirebaseClient::new(
            url,
            &config.sync_record,
            config.firebase_auth_token.clone(),
        ))
    });

    // Start the sync engine
    let sync = SyncEngine::new(catalog.clone(), local, remote).spawn();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        sync,
    });

    // Build router
    let app = route_calendar::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("route_calendar=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
