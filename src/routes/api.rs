// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar, assignment and sync API routes.

use crate::error::{AppError, Result};
use crate::models::{challenge_stats, RouteSummary, Snapshot, UserChallengeStats, UserDate};
use crate::services::calendar::{month_view, routes_for_date, DateRoutes, MonthView, RouteSort, SortDirection};
use crate::services::normalizer::is_iso_date;
use crate::services::{RecordShape, RepairReport, SyncStatus, WipeReport};
use crate::time_utils::{format_iso_date, parse_iso_date};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/calendar", get(get_calendar))
        .route("/api/dates/{date}/routes", get(get_date_routes))
        .route("/api/dates/{date}/users", get(get_date_users))
        .route("/api/users/{user}/dates", get(get_user_dates))
        .route("/api/assignments", post(create_assignment))
        .route(
            "/api/assignments/{route_index}/{user}",
            delete(delete_assignment),
        )
        .route("/api/stats", get(get_stats))
        .route("/api/data", delete(wipe_data))
        .route("/api/sync", get(get_sync_status))
        .route("/api/sync/repair", post(repair_sync))
        .route("/api/sync/inspect", get(inspect_sync))
        .route("/api/events", get(model_events))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` path or query value.
fn parse_date_param(date: &str) -> Result<NaiveDate> {
    if !is_iso_date(date) {
        return Err(AppError::BadRequest(format!(
            "Invalid date '{}': expected YYYY-MM-DD",
            date
        )));
    }
    parse_iso_date(date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{}': no such day", date)))
}

fn require_user(state: &AppState, user: &str) -> Result<()> {
    if state.catalog.has_user(user) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Unknown user '{}'", user)))
    }
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatalogResponse {
    pub users: Vec<String>,
    pub goal_miles: f64,
    pub routes: Vec<RouteSummary>,
}

async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        users: state.catalog.users().to_vec(),
        goal_miles: state.catalog.goal_miles(),
        routes: state.catalog.summaries(),
    })
}

// ─── Calendar ────────────────────────────────────────────────

#[derive(Deserialize)]
struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
    /// Show only this user's rides
    user: Option<String>,
}

/// Month grid, defaulting to the current month.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<MonthView>> {
    let today = today();
    let month = match (params.year, params.month) {
        (None, None) => today,
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid month {}-{}", year, month))
        })?,
        _ => {
            return Err(AppError::BadRequest(
                "year and month must be given together".to_string(),
            ))
        }
    };

    let user = params.user.as_deref().filter(|u| !u.is_empty());
    if let Some(user) = user {
        require_user(&state, user)?;
    }

    let view = state.sync.view();
    Ok(Json(month_view(
        &state.catalog,
        &view.model,
        month,
        user,
        today,
    )))
}

// ─── Dates ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct DateRoutesQuery {
    user: Option<String>,
    /// Search route name or map
    q: Option<String>,
    miles: Option<SortDirection>,
    elevation: Option<SortDirection>,
    map: Option<SortDirection>,
}

/// Rides on a date and the routes still available to a user.
async fn get_date_routes(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
    Query(params): Query<DateRoutesQuery>,
) -> Result<Json<DateRoutes>> {
    parse_date_param(&date)?;
    let user = params
        .user
        .ok_or_else(|| AppError::BadRequest("user is required".to_string()))?;
    require_user(&state, &user)?;

    let sort = RouteSort {
        miles: params.miles,
        elevation: params.elevation,
        map: params.map,
    };
    let view = state.sync.view();
    Ok(Json(routes_for_date(
        &state.catalog,
        &view.model,
        &date,
        &user,
        params.q.as_deref(),
        sort,
    )))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DateUsersResponse {
    pub date: String,
    pub users: Vec<String>,
}

async fn get_date_users(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<DateUsersResponse>> {
    parse_date_param(&date)?;
    let users = state.sync.view().model.users_for_date(&date);
    Ok(Json(DateUsersResponse { date, users }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserDatesResponse {
    pub user: String,
    pub rides: Vec<UserDate>,
}

async fn get_user_dates(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<UserDatesResponse>> {
    if !state.catalog.has_user(&user) {
        return Err(AppError::NotFound(format!("User '{}' not found", user)));
    }
    let rides = state.sync.view().model.dates_for_user(&user);
    Ok(Json(UserDatesResponse { user, rides }))
}

// ─── Assignments ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AssignRequest {
    pub route_index: usize,
    #[validate(length(min = 1, max = 64))]
    pub user: String,
    #[validate(length(equal = 10))]
    pub date: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AssignmentResponse {
    pub route_index: usize,
    pub user: String,
    pub date: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub revision: u64,
}

/// Add a route to a user's rides on a date.
async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<AssignmentResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    parse_date_param(&body.date)?;
    require_user(&state, &body.user)?;

    state
        .sync
        .assign(body.route_index, &body.user, &body.date)
        .await?;

    Ok(Json(AssignmentResponse {
        route_index: body.route_index,
        user: body.user,
        date: Some(body.date),
        revision: state.sync.view().revision,
    }))
}

/// Remove a route from a user's rides.
async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    Path((route_index, user)): Path<(usize, String)>,
) -> Result<Json<AssignmentResponse>> {
    require_user(&state, &user)?;
    state.sync.unassign(route_index, &user).await?;

    Ok(Json(AssignmentResponse {
        route_index,
        user,
        date: None,
        revision: state.sync.view().revision,
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatsQuery {
    /// Evaluate pace as of this date instead of today
    as_of: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub window_start: String,
    pub window_end: String,
    pub daily_target_miles: f64,
    pub goal_miles: f64,
    pub users: Vec<UserChallengeStats>,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let as_of = match params.as_of.as_deref() {
        Some(date) => parse_date_param(date)?,
        None => today(),
    };
    let window = state.config.challenge;
    let view = state.sync.view();

    Ok(Json(StatsResponse {
        window_start: format_iso_date(window.start),
        window_end: format_iso_date(window.end),
        daily_target_miles: window.daily_target_miles,
        goal_miles: state.catalog.goal_miles(),
        users: challenge_stats(
            state.catalog.routes(),
            state.catalog.users(),
            &view.model,
            &window,
            state.catalog.goal_miles(),
            as_of,
        ),
    }))
}

// ─── Data Management ─────────────────────────────────────────

#[derive(Deserialize)]
struct WipeQuery {
    #[serde(default)]
    confirm: bool,
}

/// Delete every assignment, locally and remotely.
async fn wipe_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WipeQuery>,
) -> Result<Json<WipeReport>> {
    if !params.confirm {
        return Err(AppError::BadRequest(
            "Wiping all data requires confirm=true".to_string(),
        ));
    }

    tracing::warn!("Wiping all assignment data");
    Ok(Json(state.sync.wipe().await?))
}

// ─── Sync ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub revision: u64,
    pub status: SyncStatus,
}

async fn get_sync_status(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    let view = state.sync.view();
    Json(SyncResponse {
        revision: view.revision,
        status: view.status.clone(),
    })
}

/// Overwrite the remote record with the local snapshot.
async fn repair_sync(State(state): State<Arc<AppState>>) -> Result<Json<RepairReport>> {
    Ok(Json(state.sync.repair_remote().await?))
}

async fn inspect_sync(State(state): State<Arc<AppState>>) -> Result<Json<RecordShape>> {
    Ok(Json(state.sync.inspect_remote().await?))
}

// ─── Events ──────────────────────────────────────────────────

/// Payload of a `model` event.
#[derive(Serialize)]
struct ModelEvent<'a> {
    revision: u64,
    status: &'a SyncStatus,
    snapshot: Snapshot,
}

/// Server-sent events: one `model` event per model revision.
async fn model_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let rx = state.sync.subscribe_view();

    let events = stream::unfold((rx, None::<u64>), |(mut rx, last)| async move {
        loop {
            let view = rx.borrow_and_update().clone();
            if last != Some(view.revision) {
                let event = Event::default()
                    .event("model")
                    .id(view.revision.to_string())
                    .json_data(ModelEvent {
                        revision: view.revision,
                        status: &view.status,
                        snapshot: view.model.snapshot(),
                    });
                return Some((event, (rx, Some(view.revision))));
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
