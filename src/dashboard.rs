//! Dashboard aggregation.
//!
//! [`load_dashboard`] issues the batch of per-user reads against the store
//! and hands the returned rows to [`compute_snapshot`], a pure reduction
//! producing the task/prospect counts, the current monthly recurring total,
//! a 7-day task completion series, and a 6-month recurring-revenue trend.
//! The first failing read aborts the whole batch — no partial aggregate is
//! ever returned.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::auth::UserId;
use crate::db::{DbError, DbImplementation, WorkspaceDb};
use crate::recurrence::{is_active_for_month, month_bounds};

/// Pre-fetched scalar counts consumed by [`compute_snapshot`].
#[derive(Debug, Clone, Default)]
pub struct StoreCounts {
    pub tasks_scheduled_today: i64,
    pub tasks_completed_today: i64,
    pub tasks_completed_this_week: i64,
    pub prospects_this_month: i64,
    pub prospects_converted: i64,
}

/// One day of the 7-day completion series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPoint {
    /// Short weekday label ("Mon").
    pub label: String,
    pub date: NaiveDate,
    pub count: i64,
}

/// One month of the 6-month recurring-revenue trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Short month label ("Mar").
    pub label: String,
    pub total: f64,
}

/// The derived dashboard aggregate. Stateless: recomputed in full on every
/// load, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub tasks_scheduled_today: i64,
    pub tasks_completed_today: i64,
    pub tasks_completed_this_week: i64,
    pub prospects_this_month: i64,
    pub prospects_converted: i64,
    /// Converted prospects as a whole percentage of this month's prospects.
    pub conversion_rate: i64,
    /// Sum of recurring amounts over implementations billing-eligible this month.
    pub monthly_recurring_total: f64,
    /// Active implementations whose deliverable is not yet complete.
    pub delivery_pending: usize,
    /// Oldest to newest, zero-filled, ending today.
    pub completions_7d: Vec<CompletionPoint>,
    /// Oldest to newest, ending at the current month.
    pub recurring_trend_6m: Vec<TrendPoint>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Sum of recurring amounts over implementations billing-eligible for the
/// month containing `reference`.
pub fn monthly_recurring_total(
    implementations: &[DbImplementation],
    reference: NaiveDate,
) -> f64 {
    implementations
        .iter()
        .filter(|imp| is_active_for_month(imp, reference))
        .map(|imp| imp.recurring_amount.unwrap_or(0.0))
        .sum()
}

/// Pure reduction over already-fetched rows.
///
/// `completed_dates` holds the scheduled dates of tasks completed within the
/// 7-day window ending at `today`; a date outside the window simply never
/// matches a bucket. The 6-month trend re-runs the eligibility test against
/// every implementation for each month — O(6 x n), fine at tens to low
/// hundreds of rows.
pub fn compute_snapshot(
    implementations: &[DbImplementation],
    completed_dates: &[NaiveDate],
    counts: &StoreCounts,
    today: NaiveDate,
) -> DashboardSnapshot {
    let delivery_pending = implementations
        .iter()
        .filter(|imp| imp.status == "active" && !imp.delivered)
        .count();

    let completions_7d = (0..7u64)
        .rev()
        .map(|back| {
            let date = today - Days::new(back);
            CompletionPoint {
                label: date.format("%a").to_string(),
                date,
                count: completed_dates.iter().filter(|d| **d == date).count() as i64,
            }
        })
        .collect();

    let recurring_trend_6m = (0..6u32)
        .rev()
        .map(|back| {
            let month = today - Months::new(back);
            TrendPoint {
                label: month.format("%b").to_string(),
                total: monthly_recurring_total(implementations, month),
            }
        })
        .collect();

    let conversion_rate = if counts.prospects_this_month > 0 {
        let ratio = counts.prospects_converted as f64 / counts.prospects_this_month as f64;
        (ratio * 100.0).round() as i64
    } else {
        0
    };

    DashboardSnapshot {
        tasks_scheduled_today: counts.tasks_scheduled_today,
        tasks_completed_today: counts.tasks_completed_today,
        tasks_completed_this_week: counts.tasks_completed_this_week,
        prospects_this_month: counts.prospects_this_month,
        prospects_converted: counts.prospects_converted,
        conversion_rate,
        monthly_recurring_total: monthly_recurring_total(implementations, today),
        delivery_pending,
        completions_7d,
        recurring_trend_6m,
    }
}

/// Load the dashboard for a signed-in user.
///
/// Issues the batch of reads scoped to `user` and aggregates the results.
/// Any failing read propagates immediately; callers keep whatever snapshot
/// they were already showing.
pub fn load_dashboard(
    db: &WorkspaceDb,
    user: &UserId,
    today: NaiveDate,
) -> Result<DashboardSnapshot, DbError> {
    let (month_start, _) = month_bounds(today);
    let monday = week_start(today);
    let week_end = monday + Days::new(6);
    let window_start = today - Days::new(6);

    let counts = StoreCounts {
        tasks_scheduled_today: db.count_tasks_scheduled_on(user, today)?,
        tasks_completed_today: db.count_tasks_completed_on(user, today)?,
        tasks_completed_this_week: db.count_tasks_completed_between(user, monday, week_end)?,
        prospects_this_month: db.count_prospects_created_since(user, month_start)?,
        prospects_converted: db.count_prospects_converted(user)?,
    };

    let implementations = db.get_user_implementations(user)?;
    let completed_dates = db.completed_task_dates(user, window_start, today)?;

    Ok(compute_snapshot(
        &implementations,
        &completed_dates,
        &counts,
        today,
    ))
}
