// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sanitizes raw assignment data into the canonical shape.
//!
//! Every assignment value becomes either `None` or a `YYYY-MM-DD` string.
//! Spreadsheet imports leave boolean checkmarks in place of dates, and remote
//! data is untrusted, so anything else is dropped to `None`. These functions
//! never fail.

use crate::models::{RouteEntry, UserDates};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Whether a string has the storage date shape.
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s)
}

/// Sanitize a single raw assignment value.
pub fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_iso_date(s) => Some(s.clone()),
        _ => None,
    }
}

/// Sanitize one route's user -> raw value mapping.
pub fn normalize_users(raw: &Map<String, Value>) -> UserDates {
    raw.iter()
        .map(|(user, value)| (user.clone(), normalize_value(value)))
        .collect()
}

/// Sanitize one snapshot entry (`{"users": {...}}`).
///
/// Entries that are not objects, or whose `users` is missing or not an
/// object, become an empty mapping.
pub fn normalize_entry(entry: &Value) -> RouteEntry {
    let users = entry
        .get("users")
        .and_then(Value::as_object)
        .map(normalize_users)
        .unwrap_or_default();
    RouteEntry { users }
}

/// Sanitize a catalog route's mapping, filling every known user.
pub fn normalize_catalog_users(raw: &Map<String, Value>, users: &[String]) -> UserDates {
    let mut dates = normalize_users(raw);
    for user in users {
        dates.entry(user.clone()).or_insert(None);
    }
    dates
}
