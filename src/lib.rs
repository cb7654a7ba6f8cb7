// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Route Calendar: a shared ride calendar for a cycling route challenge
//!
//! This crate provides the backend API for scheduling catalog routes on
//! calendar dates and keeping every client's assignments in sync through a
//! realtime remote store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{RouteCatalog, SyncHandle};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<RouteCatalog>,
    pub sync: SyncHandle,
}
