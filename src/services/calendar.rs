// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar views built from the assignment model.
//!
//! - Month grid (6 weeks x 7 days, Sunday first) with rides per day
//! - Rides already on a date, grouped by route
//! - Routes still available to a user on a date, searched and sorted

use crate::models::{AssignmentModel, RouteSummary};
use crate::services::RouteCatalog;
use crate::time_utils::{days_in_month, format_iso_date, month_label, month_start, shift_month};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Cells in the month grid.
const GRID_CELLS: u32 = 42;

// ─── Month Grid ──────────────────────────────────────────────

/// A ride shown in a calendar cell.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarRide {
    pub user: String,
    pub route_index: usize,
    pub route: String,
    pub map: String,
    pub miles: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub is_today: bool,
    pub rides: Vec<CalendarRide>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// Empty cells before day 1 (0 = month starts on Sunday)
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    /// Empty cells after the last day to fill the grid
    pub trailing_blanks: u32,
    /// `YYYY-MM` of the previous and next month, for navigation
    pub prev: String,
    pub next: String,
    pub user_filter: Option<String>,
}

/// Build the month grid for the month containing `month`.
///
/// `user_filter` restricts rides to one user; `None` shows everyone.
pub fn month_view(
    catalog: &RouteCatalog,
    model: &AssignmentModel,
    month: NaiveDate,
    user_filter: Option<&str>,
    today: NaiveDate,
) -> MonthView {
    let start = month_start(month);
    let day_count = days_in_month(start);
    let leading_blanks = start.weekday().num_days_from_sunday();

    let mut days: Vec<CalendarDay> = (0..day_count)
        .map(|offset| {
            let date = start + chrono::Days::new(offset as u64);
            CalendarDay {
                day: offset + 1,
                date: format_iso_date(date),
                is_today: date == today,
                rides: vec![],
            }
        })
        .collect();

    let month_prefix = start.format("%Y-%m-").to_string();
    for (route_index, user, date) in model.assigned() {
        if user_filter.is_some_and(|u| u != user) || !date.starts_with(&month_prefix) {
            continue;
        }
        let Some(route) = catalog.route(route_index) else {
            continue;
        };
        let Some(day) = days.iter_mut().find(|d| d.date == date) else {
            continue;
        };
        day.rides.push(CalendarRide {
            user: user.to_string(),
            route_index,
            route: route.name.clone(),
            map: route.map.clone(),
            miles: route.miles(),
        });
    }

    MonthView {
        year: start.year(),
        month: start.month(),
        label: month_label(start),
        leading_blanks,
        days,
        trailing_blanks: GRID_CELLS.saturating_sub(leading_blanks + day_count),
        prev: shift_month(start, -1).format("%Y-%m").to_string(),
        next: shift_month(start, 1).format("%Y-%m").to_string(),
        user_filter: user_filter.map(str::to_string),
    }
}

// ─── Routes For A Date ───────────────────────────────────────

/// Sort direction for one route list criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Route list sorting: miles first, then elevation, then map, then name.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RouteSort {
    pub miles: Option<SortDirection>,
    pub elevation: Option<SortDirection>,
    pub map: Option<SortDirection>,
}

/// A route already ridden on the selected date.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DateRide {
    pub route: RouteSummary,
    pub riders: Vec<String>,
    pub joint_ride: bool,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DateRoutes {
    pub date: String,
    pub user: String,
    pub rides: Vec<DateRide>,
    /// Routes the selected user has not yet added on this date
    pub available: Vec<RouteSummary>,
}

/// Rides on `date` plus the routes still available to `user`.
///
/// A route another user already rides that day stays available so `user` can
/// join it.
pub fn routes_for_date(
    catalog: &RouteCatalog,
    model: &AssignmentModel,
    date: &str,
    user: &str,
    query: Option<&str>,
    sort: RouteSort,
) -> DateRoutes {
    let rides = model
        .rides_on_date(date)
        .into_iter()
        .filter_map(|(index, riders)| {
            let route = catalog.route(index)?;
            Some(DateRide {
                route: RouteSummary::new(index, route),
                joint_ride: riders.len() > 1,
                riders,
            })
        })
        .collect();

    let query = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut available: Vec<RouteSummary> = catalog
        .summaries()
        .into_iter()
        .filter(|r| model.date_for(r.index, user) != Some(date))
        .filter(|r| {
            query.as_deref().map_or(true, |q| {
                r.name.to_lowercase().contains(q) || r.map.to_lowercase().contains(q)
            })
        })
        .collect();

    available.sort_by(|a, b| compare_routes(a, b, sort));

    DateRoutes {
        date: date.to_string(),
        user: user.to_string(),
        rides,
        available,
    }
}

fn compare_routes(a: &RouteSummary, b: &RouteSummary, sort: RouteSort) -> Ordering {
    let by_miles = sort
        .miles
        .map(|dir| dir.apply(a.miles.total_cmp(&b.miles)))
        .unwrap_or(Ordering::Equal);
    let by_elevation = sort
        .elevation
        .map(|dir| dir.apply(a.elevation_meters.total_cmp(&b.elevation_meters)))
        .unwrap_or(Ordering::Equal);
    let by_map = sort
        .map
        .map(|dir| dir.apply(a.map.to_lowercase().cmp(&b.map.to_lowercase())))
        .unwrap_or(Ordering::Equal);

    by_miles
        .then(by_elevation)
        .then(by_map)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_iso_date;
    use serde_json::json;

    fn catalog() -> RouteCatalog {
        RouteCatalog::load_from_json(
            &json!({
                "users": ["Alice", "Bob"],
                "goal_miles": 100,
                "routes": [
                    {"route": "Zeta", "map": "Watopia", "length_miles": 10, "elevation": "300m (984')"},
                    {"route": "Alpha", "map": "London", "length_miles": 25, "elevation": "100m (328')"},
                    {"route": "Mid", "map": "France", "length_miles": 10, "elevation": "50m (164')"}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn test_month_view_layout() {
        let catalog = catalog();
        let mut model = catalog.initial_assignments();
        model.assign(0, "Alice", "2025-12-10");
        model.assign(1, "Bob", "2025-12-10");
        model.assign(2, "Bob", "2026-01-02");

        let view = month_view(&catalog, &model, date("2025-12-17"), None, date("2025-12-08"));

        assert_eq!(view.label, "December 2025");
        // 2025-12-01 is a Monday
        assert_eq!(view.leading_blanks, 1);
        assert_eq!(view.days.len(), 31);
        assert_eq!(view.trailing_blanks, 10);
        assert_eq!(view.prev, "2025-11");
        assert_eq!(view.next, "2026-01");
        assert!(view.days[7].is_today);
        assert_eq!(view.days[9].rides.len(), 2);
        assert!(view.days.iter().map(|d| d.rides.len()).sum::<usize>() == 2);
    }

    #[test]
    fn test_month_view_user_filter() {
        let catalog = catalog();
        let mut model = catalog.initial_assignments();
        model.assign(0, "Alice", "2025-12-10");
        model.assign(1, "Bob", "2025-12-10");

        let view = month_view(&catalog, &model, date("2025-12-01"), Some("Bob"), date("2025-12-01"));

        assert_eq!(view.days[9].rides.len(), 1);
        assert_eq!(view.days[9].rides[0].route, "Alpha");
    }

    #[test]
    fn test_routes_for_date_groups_joint_rides() {
        let catalog = catalog();
        let mut model = catalog.initial_assignments();
        model.assign(0, "Alice", "2025-12-10");
        model.assign(0, "Bob", "2025-12-10");

        let result = routes_for_date(&catalog, &model, "2025-12-10", "Alice", None, RouteSort::default());

        assert_eq!(result.rides.len(), 1);
        assert!(result.rides[0].joint_ride);
        assert_eq!(result.rides[0].riders, vec!["Alice", "Bob"]);
        // Alice already rides Zeta that day; default order is by name
        let names: Vec<_> = result.available.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid"]);
    }

    #[test]
    fn test_other_users_route_stays_available() {
        let catalog = catalog();
        let mut model = catalog.initial_assignments();
        model.assign(0, "Bob", "2025-12-10");

        let result = routes_for_date(&catalog, &model, "2025-12-10", "Alice", None, RouteSort::default());

        assert_eq!(result.available.len(), 3);
    }

    #[test]
    fn test_search_and_sort() {
        let catalog = catalog();
        let model = catalog.initial_assignments();

        let sort = RouteSort {
            miles: Some(SortDirection::Desc),
            elevation: Some(SortDirection::Asc),
            map: None,
        };
        let result = routes_for_date(&catalog, &model, "2025-12-10", "Alice", None, sort);
        let names: Vec<_> = result.available.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);

        let result = routes_for_date(&catalog, &model, "2025-12-10", "Alice", Some(" LONDON "), RouteSort::default());
        assert_eq!(result.available.len(), 1);
        assert_eq!(result.available[0].name, "Alpha");
    }
}
