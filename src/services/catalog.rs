// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route catalog loading.

use crate::models::{AssignmentModel, Route, RouteSummary};
use crate::services::normalizer::normalize_catalog_users;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Catalog document as exported from the route spreadsheet.
#[derive(Deserialize)]
struct CatalogDocument {
    users: Vec<String>,
    routes: Vec<CatalogEntry>,
    goal_miles: f64,
}

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    route: Route,
    #[serde(default)]
    users: Map<String, Value>,
}

/// The immutable route catalog plus the assignments it was seeded with.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    users: Vec<String>,
    routes: Vec<Route>,
    goal_miles: f64,
    initial: AssignmentModel,
}

impl RouteCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogLoadError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogLoadError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogLoadError> {
        let document: CatalogDocument = serde_json::from_str(json_data)
            .map_err(|e| CatalogLoadError::ParseError(e.to_string()))?;

        if document.routes.is_empty() {
            return Err(CatalogLoadError::NoRoutes);
        }
        if document.users.is_empty() {
            return Err(CatalogLoadError::NoUsers);
        }

        let users = document.users;
        let mut routes = Vec::with_capacity(document.routes.len());
        let mut seeded = Vec::with_capacity(document.routes.len());
        for entry in document.routes {
            seeded.push(normalize_catalog_users(&entry.users, &users));
            routes.push(entry.route);
        }

        tracing::info!(
            routes = routes.len(),
            users = users.len(),
            goal_miles = document.goal_miles,
            "Loaded route catalog"
        );

        let initial = AssignmentModel::new(seeded).with_roster(&users);
        Ok(Self {
            users,
            routes,
            goal_miles: document.goal_miles,
            initial,
        })
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn goal_miles(&self) -> f64 {
        self.goal_miles
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.users.iter().any(|u| u == user)
    }

    /// Assignment state seeded from the catalog (normalized).
    pub fn initial_assignments(&self) -> AssignmentModel {
        self.initial.clone()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .enumerate()
            .map(|(index, route)| RouteSummary::new(index, route))
            .collect()
    }
}

/// Errors loading the catalog. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Catalog has no routes")]
    NoRoutes,

    #[error("Catalog has no users")]
    NoUsers,
}
