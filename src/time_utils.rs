// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{Datelike, Months, NaiveDate};

/// Storage format for assignment dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, `None` if malformed or not a real day.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, ISO_DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `delta` months away from the month of `date`.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let start = month_start(date);
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        start.checked_add_months(months)
    } else {
        start.checked_sub_months(months)
    };
    shifted.unwrap_or(start)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let start = month_start(date);
    let next = shift_month(start, 1);
    (next - start).num_days() as u32
}

/// Month label such as "December 2025".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}
