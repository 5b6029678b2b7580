//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

/// A row from the `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTask {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Calendar date the task is scheduled for (`YYYY-MM-DD`).
    pub scheduled_date: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// A row from the `prospects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbProspect {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `implementations` table.
///
/// An implementation is a billable client engagement. `recurring_amount` is
/// absent when the engagement carries no recurring charge. `start_date` and
/// `end_date` bound the billing window; the start falls back to `created_at`
/// and a missing end means the window is open-ended. Dates are stored as TEXT
/// and parsed leniently at computation time — a malformed value is treated as
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbImplementation {
    pub id: String,
    pub user_id: String,
    pub client_name: String,
    pub recurring_amount: Option<f64>,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub delivered: bool,
    pub created_at: String,
    pub updated_at: String,
}
