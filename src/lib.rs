//! Revboard core library.
//!
//! A SQLite-backed workspace store (tasks, prospects, implementations) plus
//! the aggregation layer that turns a signed-in user's rows into the
//! dashboard snapshot: today/this-week task counts, prospect counts with a
//! conversion rate, the current monthly recurring total, a 7-day task
//! completion series, and a 6-month recurring-revenue trend.
//!
//! The aggregation itself ([`dashboard::compute_snapshot`]) is pure — it only
//! sees already-fetched typed rows, so it unit-tests without a database.

pub mod auth;
pub mod dashboard;
pub mod db;
pub mod migrations;
pub mod policy;
pub mod recurrence;
pub mod seed;
