// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user mileage statistics over the challenge window.
//!
//! Totals are recomputed from the assignment model on every request; the
//! model is small (routes x users) so there is nothing to cache.

use crate::models::{AssignmentModel, Route};
use crate::time_utils::parse_iso_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The fixed date range over which mileage goals are tracked (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Miles each rider should average per day
    pub daily_target_miles: f64,
}

impl ChallengeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the window, both ends included.
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Day number within the window (1-based), clamped to `0..=length_days`.
    ///
    /// 0 means the challenge has not started yet.
    pub fn days_elapsed(&self, today: NaiveDate) -> i64 {
        ((today - self.start).num_days() + 1).clamp(0, self.length_days())
    }
}

/// Challenge statistics for one user.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserChallengeStats {
    pub user: String,

    // ─── Totals ──────────────────────────────────────────────────
    /// Miles of assigned rides dated inside the window
    pub total_miles: f64,
    pub goal_miles: f64,
    pub remaining_miles: f64,
    /// Percentage of the goal, capped at 100
    pub progress_percent: f64,
    pub goal_achieved: bool,

    // ─── Daily Pace ──────────────────────────────────────────────
    pub days_elapsed: i64,
    pub window_days: i64,
    /// Miles expected by today at the daily target
    pub target_to_date: f64,
    pub on_track: bool,
    /// Positive when ahead of the daily target, negative when behind
    pub miles_ahead: f64,
}

/// Compute stats for every configured user, in catalog user order.
pub fn challenge_stats(
    routes: &[Route],
    users: &[String],
    model: &AssignmentModel,
    window: &ChallengeWindow,
    goal_miles: f64,
    today: NaiveDate,
) -> Vec<UserChallengeStats> {
    let mut totals: HashMap<&str, f64> = users.iter().map(|u| (u.as_str(), 0.0)).collect();

    for (route_index, user, date) in model.assigned() {
        let Some(total) = totals.get_mut(user) else {
            continue;
        };
        let Some(route) = routes.get(route_index) else {
            continue;
        };
        if parse_iso_date(date).is_some_and(|d| window.contains(d)) {
            *total += route.miles();
        }
    }

    let days_elapsed = window.days_elapsed(today);
    let target_to_date = days_elapsed as f64 * window.daily_target_miles;

    users
        .iter()
        .map(|user| {
            let total_miles = totals.get(user.as_str()).copied().unwrap_or(0.0);
            let progress = if goal_miles > 0.0 {
                total_miles / goal_miles * 100.0
            } else {
                100.0
            };
            UserChallengeStats {
                user: user.clone(),
                total_miles,
                goal_miles,
                remaining_miles: (goal_miles - total_miles).max(0.0),
                progress_percent: progress.min(100.0),
                goal_achieved: total_miles >= goal_miles,
                days_elapsed,
                window_days: window.length_days(),
                target_to_date,
                on_track: total_miles >= target_to_date,
                miles_ahead: total_miles - target_to_date,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::UserDates;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn window() -> ChallengeWindow {
        ChallengeWindow {
            start: date("2025-12-08"),
            end: date("2025-12-23"),
            daily_target_miles: 20.0,
        }
    }

    fn route(name: &str, miles: f64) -> Route {
        Route {
            name: name.to_string(),
            map: "Watopia".to_string(),
            length_km: None,
            length_miles: Some(miles),
            elevation: None,
            lead_in: None,
            badge_xp: None,
        }
    }

    fn users(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn empty_model(routes: usize, names: &[&str]) -> AssignmentModel {
        let entry: UserDates = names.iter().map(|u| (u.to_string(), None)).collect();
        AssignmentModel::new(vec![entry; routes])
    }

    #[test]
    fn test_window_length_and_elapsed() {
        let w = window();
        assert_eq!(w.length_days(), 16);
        assert_eq!(w.days_elapsed(date("2025-12-01")), 0);
        assert_eq!(w.days_elapsed(date("2025-12-08")), 1);
        assert_eq!(w.days_elapsed(date("2025-12-15")), 8);
        assert_eq!(w.days_elapsed(date("2026-01-10")), 16);
    }

    #[test]
    fn test_single_ride_counts_route_miles() {
        let routes = vec![route("A", 20.0)];
        let names = users(&["Alice", "Bob"]);
        let mut model = empty_model(1, &["Alice", "Bob"]);
        model.assign(0, "Alice", "2025-12-10");

        let stats = challenge_stats(&routes, &names, &model, &window(), 312.5, date("2025-12-10"));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].user, "Alice");
        assert_eq!(stats[0].total_miles, 20.0);
        assert_eq!(stats[0].days_elapsed, 3);
        assert_eq!(stats[0].target_to_date, 60.0);
        assert!(!stats[0].on_track);
        assert_eq!(stats[0].miles_ahead, -40.0);
        assert_eq!(stats[1].total_miles, 0.0);
    }

    #[test]
    fn test_rides_outside_window_are_ignored() {
        let routes = vec![route("A", 10.0), route("B", 5.0)];
        let names = users(&["Alice"]);
        let mut model = empty_model(2, &["Alice"]);
        model.assign(0, "Alice", "2025-12-07");
        model.assign(1, "Alice", "2025-12-23");

        let stats = challenge_stats(&routes, &names, &model, &window(), 100.0, date("2025-12-01"));

        assert_eq!(stats[0].total_miles, 5.0);
        assert_eq!(stats[0].remaining_miles, 95.0);
        assert_eq!(stats[0].progress_percent, 5.0);
        // Before the start nothing is expected yet
        assert!(stats[0].on_track);
    }

    #[test]
    fn test_goal_achieved_caps_progress() {
        let routes = vec![route("Long", 400.0)];
        let names = users(&["Alice"]);
        let mut model = empty_model(1, &["Alice"]);
        model.assign(0, "Alice", "2025-12-12");

        let stats = challenge_stats(&routes, &names, &model, &window(), 312.5, date("2025-12-23"));

        assert!(stats[0].goal_achieved);
        assert_eq!(stats[0].remaining_miles, 0.0);
        assert_eq!(stats[0].progress_percent, 100.0);
    }

    #[test]
    fn test_unknown_users_are_not_reported() {
        let routes = vec![route("A", 10.0)];
        let names = users(&["Alice"]);
        let mut model = empty_model(1, &["Alice"]);
        model.assign(0, "Mallory", "2025-12-10");

        let stats = challenge_stats(&routes, &names, &model, &window(), 100.0, date("2025-12-10"));

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_miles, 0.0);
    }
}
