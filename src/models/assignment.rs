// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory route <-> user <-> date assignments.
//!
//! This is the innermost layer: it trusts its inputs. Dates are expected to be
//! normalized `YYYY-MM-DD` strings and route indices to be within the catalog.

use crate::models::snapshot::{RouteEntry, Snapshot, UserDates};
use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A user's ride on a given route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserDate {
    pub route: usize,
    pub date: String,
}

/// Assignment state, one mapping per catalog route.
///
/// Snapshots may carry users outside the roster. Their entries are kept and
/// persisted, but the query helpers only report roster users.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentModel {
    routes: Vec<UserDates>,
    /// `None` reports every user
    roster: Option<Vec<String>>,
}

impl AssignmentModel {
    pub fn new(routes: Vec<UserDates>) -> Self {
        Self {
            routes,
            roster: None,
        }
    }

    /// Restrict the query helpers to these users.
    pub fn with_roster(mut self, users: &[String]) -> Self {
        self.roster = Some(users.to_vec());
        self
    }

    fn on_roster(&self, user: &str) -> bool {
        self.roster
            .as_ref()
            .map_or(true, |roster| roster.iter().any(|u| u == user))
    }

    /// Number of routes tracked (equals the catalog length).
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Set the date for a (route, user) pair, overwriting any previous date.
    pub fn assign(&mut self, route_index: usize, user: &str, date: &str) {
        if let Some(users) = self.routes.get_mut(route_index) {
            users.insert(user.to_string(), Some(date.to_string()));
        }
    }

    /// Clear the date for a (route, user) pair.
    pub fn unassign(&mut self, route_index: usize, user: &str) {
        if let Some(users) = self.routes.get_mut(route_index) {
            users.insert(user.to_string(), None);
        }
    }

    /// Replace assignments from a snapshot, position by position.
    ///
    /// Each route covered by the snapshot has its mapping cleared and then
    /// overlaid with the snapshot's entry. Snapshot entries beyond the last
    /// route are ignored; routes beyond the snapshot keep their assignments.
    pub fn replace_all(&mut self, snapshot: &Snapshot) {
        for (users, entry) in self.routes.iter_mut().zip(&snapshot.routes) {
            for date in users.values_mut() {
                *date = None;
            }
            for (user, date) in &entry.users {
                users.insert(user.clone(), date.clone());
            }
        }
    }

    /// Reset every assignment to unassigned.
    pub fn clear(&mut self) {
        for users in &mut self.routes {
            for date in users.values_mut() {
                *date = None;
            }
        }
    }

    pub fn date_for(&self, route_index: usize, user: &str) -> Option<&str> {
        self.routes
            .get(route_index)
            .and_then(|users| users.get(user))
            .and_then(|date| date.as_deref())
    }

    /// Iterate over every assigned (route index, user, date) of roster users.
    pub fn assigned(&self) -> impl Iterator<Item = (usize, &str, &str)> + '_ {
        self.routes.iter().enumerate().flat_map(move |(index, users)| {
            users
                .iter()
                .filter(move |(user, _)| self.on_roster(user))
                .filter_map(move |(user, date)| date.as_deref().map(|d| (index, user.as_str(), d)))
        })
    }

    /// All rides for a user, ordered by route index.
    pub fn dates_for_user(&self, user: &str) -> Vec<UserDate> {
        self.assigned()
            .filter(|(_, u, _)| *u == user)
            .map(|(route, _, date)| UserDate {
                route,
                date: date.to_string(),
            })
            .collect()
    }

    /// Distinct users riding anything on a date, sorted.
    pub fn users_for_date(&self, date: &str) -> Vec<String> {
        self.assigned()
            .filter(|(_, _, d)| *d == date)
            .map(|(_, user, _)| user.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Routes ridden on a date with their riders (more than one = joint ride).
    pub fn rides_on_date(&self, date: &str) -> Vec<(usize, Vec<String>)> {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(index, users)| {
                let riders: Vec<String> = users
                    .iter()
                    .filter(|(user, d)| d.as_deref() == Some(date) && self.on_roster(user))
                    .map(|(user, _)| user.clone())
                    .collect();
                (!riders.is_empty()).then_some((index, riders))
            })
            .collect()
    }

    /// Full snapshot for persistence and sync.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            routes: self
                .routes
                .iter()
                .map(|users| RouteEntry {
                    users: users.clone(),
                })
                .collect(),
        }
    }
}
