//! Recurrence window evaluation.
//!
//! An implementation's recurring charge counts toward a calendar month when
//! its billing window overlaps that month. The window is the closed interval
//! from the effective start date (explicit start date, else creation date) to
//! the explicit end date, open-ended when the end is absent. Time-of-day on
//! stored timestamps is discarded.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime};

use crate::db::DbImplementation;

/// First and last day of the month containing `reference`.
pub fn month_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = reference.with_day(1).expect("day 1 exists in every month");
    let end = start + Months::new(1) - Days::new(1);
    (start, end)
}

/// Parse a stored date leniently: bare `YYYY-MM-DD`, RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Returns `None` for anything else —
/// a malformed stored value is treated as absent, not as an error.
pub fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.date());
    }
    None
}

/// The date an implementation's billing window opens: the explicit start
/// date when present and parseable, else the creation date. `None` when both
/// are malformed; such a row is never billing-eligible.
pub fn effective_start(implementation: &DbImplementation) -> Option<NaiveDate> {
    implementation
        .start_date
        .as_deref()
        .and_then(parse_stored_date)
        .or_else(|| parse_stored_date(&implementation.created_at))
}

/// Whether `implementation` is billing-eligible for the month containing
/// `reference`.
///
/// Eligible iff the recurring amount is positive, the status is `active`,
/// the effective start is not after the month's last day, and the end date
/// (when present) is not before the month's first day.
pub fn is_active_for_month(implementation: &DbImplementation, reference: NaiveDate) -> bool {
    if implementation.recurring_amount.unwrap_or(0.0) <= 0.0 {
        return false;
    }
    if implementation.status != "active" {
        return false;
    }

    let (month_start, month_end) = month_bounds(reference);

    let Some(start) = effective_start(implementation) else {
        return false;
    };
    if start > month_end {
        return false;
    }

    if let Some(end) = implementation
        .end_date
        .as_deref()
        .and_then(parse_stored_date)
    {
        if end < month_start {
            return false;
        }
    }

    true
}
