//! SQLite-based workspace store: users, tasks, prospects, and implementations.
//!
//! The database lives at `~/.revboard/revboard.db`. Every workspace row
//! carries a `user_id` owner column; read queries filter on it in SQL, and
//! write paths check the ownership predicate in [`crate::policy`] before
//! touching a row. The dashboard layer trusts that any rows handed to it
//! already belong to the requesting user.

use std::path::PathBuf;

use rusqlite::Connection;

pub mod types;
pub use types::*;

pub struct WorkspaceDb {
    conn: Connection,
}

impl WorkspaceDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `~/.revboard/revboard.db` and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Used by `--db` and by tests.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.revboard/revboard.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".revboard").join("revboard.db"))
    }
}

pub mod implementations;
pub mod prospects;
pub mod tasks;
pub mod users;

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::WorkspaceDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the
    /// test; the OS cleans up test temp dirs. FK enforcement is disabled so
    /// unit tests can insert rows without a matching user row.
    pub fn test_db() -> WorkspaceDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        let db = WorkspaceDb::open_at(path).expect("Failed to open test database");
        db.conn_ref()
            .execute_batch("PRAGMA foreign_keys = OFF;")
            .expect("disable FK for tests");
        db
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;
    use crate::auth::UserId;
    use chrono::NaiveDate;

    fn sample_task(id: &str, user_id: &str, scheduled: &str, status: &str) -> DbTask {
        DbTask {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: format!("Task {id}"),
            scheduled_date: scheduled.to_string(),
            status: status.to_string(),
            created_at: "2024-05-01T09:00:00+00:00".to_string(),
            updated_at: "2024-05-01T09:00:00+00:00".to_string(),
            completed_at: None,
        }
    }

    fn sample_prospect(id: &str, user_id: &str, status: &str, created_at: &str) -> DbProspect {
        DbProspect {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: format!("Prospect {id}"),
            status: status.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    fn sample_implementation(id: &str, user_id: &str, amount: Option<f64>) -> DbImplementation {
        DbImplementation {
            id: id.to_string(),
            user_id: user_id.to_string(),
            client_name: format!("Client {id}"),
            recurring_amount: amount,
            status: "active".to_string(),
            start_date: None,
            end_date: None,
            delivered: false,
            created_at: "2024-01-15T09:00:00+00:00".to_string(),
            updated_at: "2024-01-15T09:00:00+00:00".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        for table in ["users", "tasks", "prospects", "implementations"] {
            let count: i32 = db
                .conn_ref()
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap_or_else(|_| panic!("{table} table should exist"));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_idempotent_schema_application() {
        // Opening the same DB twice should not error (IF NOT EXISTS)
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("idempotent.db");

        let _db1 = WorkspaceDb::open_at(path.clone()).expect("first open");
        let _db2 = WorkspaceDb::open_at(path).expect("second open should not fail");
    }

    #[test]
    fn test_upsert_and_get_user_by_email() {
        let db = test_db();
        let user = DbUser {
            id: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        db.upsert_user(&user).expect("upsert user");

        // Case-insensitive lookup
        let found = db
            .get_user_by_email("Ana@Example.com")
            .expect("query")
            .expect("user should exist");
        assert_eq!(found.id, "user-1");
        assert_eq!(found.name, "Ana");

        let missing = db.get_user_by_email("nobody@example.com").expect("query");
        assert!(missing.is_none());
    }

    #[test]
    fn test_upsert_user_updates_existing() {
        let db = test_db();
        let mut user = DbUser {
            id: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        db.upsert_user(&user).expect("first upsert");

        user.name = "Ana Souza".to_string();
        db.upsert_user(&user).expect("second upsert");

        let found = db
            .get_user_by_email("ana@example.com")
            .expect("query")
            .expect("exists");
        assert_eq!(found.name, "Ana Souza");
    }

    #[test]
    fn test_task_counts_scoped_to_user() {
        let db = test_db();
        db.upsert_task(&sample_task("t1", "user-1", "2024-05-04", "pending"))
            .expect("insert");
        db.upsert_task(&sample_task("t2", "user-1", "2024-05-04", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t3", "user-2", "2024-05-04", "pending"))
            .expect("insert");

        let user = UserId::new("user-1");
        let scheduled = db
            .count_tasks_scheduled_on(&user, date(2024, 5, 4))
            .expect("count");
        assert_eq!(scheduled, 2, "other users' tasks must not be counted");

        let completed = db
            .count_tasks_completed_on(&user, date(2024, 5, 4))
            .expect("count");
        assert_eq!(completed, 1);
    }

    #[test]
    fn test_count_tasks_completed_between() {
        let db = test_db();
        db.upsert_task(&sample_task("t1", "user-1", "2024-04-29", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t2", "user-1", "2024-05-01", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t3", "user-1", "2024-05-06", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t4", "user-1", "2024-05-01", "pending"))
            .expect("insert");

        let user = UserId::new("user-1");
        // Monday-start week 2024-04-29..2024-05-05
        let count = db
            .count_tasks_completed_between(&user, date(2024, 4, 29), date(2024, 5, 5))
            .expect("count");
        assert_eq!(count, 2, "window is inclusive and excludes pending tasks");
    }

    #[test]
    fn test_completed_task_dates_skips_malformed() {
        let db = test_db();
        db.upsert_task(&sample_task("t1", "user-1", "2024-05-01", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t2", "user-1", "2024-05-01", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t3", "user-1", "not-a-date", "completed"))
            .expect("insert");
        db.upsert_task(&sample_task("t4", "user-1", "2024-05-03", "completed"))
            .expect("insert");

        let user = UserId::new("user-1");
        let dates = db
            .completed_task_dates(&user, date(2024, 4, 28), date(2024, 5, 4))
            .expect("query");
        assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 1), date(2024, 5, 3)]);
    }

    #[test]
    fn test_set_task_status_enforces_owner() {
        let db = test_db();
        db.upsert_task(&sample_task("t1", "user-1", "2024-05-04", "pending"))
            .expect("insert");

        // A non-owner cannot complete the task
        let intruder = UserId::new("user-2");
        let changed = db
            .set_task_status(&intruder, "t1", "completed")
            .expect("call");
        assert!(!changed, "non-owner update must be refused");

        let owner = UserId::new("user-1");
        let changed = db.set_task_status(&owner, "t1", "completed").expect("call");
        assert!(changed);

        let task = db.get_task("t1").expect("query").expect("exists");
        assert_eq!(task.status, "completed");
        assert!(task.completed_at.is_some());

        // Missing row reports false rather than erroring
        let missing = db
            .set_task_status(&owner, "nonexistent", "completed")
            .expect("call");
        assert!(!missing);
    }

    #[test]
    fn test_set_task_status_clears_completed_at() {
        let db = test_db();
        db.upsert_task(&sample_task("t1", "user-1", "2024-05-04", "pending"))
            .expect("insert");

        let owner = UserId::new("user-1");
        db.set_task_status(&owner, "t1", "completed").expect("complete");
        db.set_task_status(&owner, "t1", "pending").expect("reopen");

        let task = db.get_task("t1").expect("query").expect("exists");
        assert_eq!(task.status, "pending");
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_prospect_counts() {
        let db = test_db();
        db.upsert_prospect(&sample_prospect(
            "p1",
            "user-1",
            "new",
            "2024-05-02T10:00:00+00:00",
        ))
        .expect("insert");
        db.upsert_prospect(&sample_prospect(
            "p2",
            "user-1",
            "converted",
            "2024-05-03T10:00:00+00:00",
        ))
        .expect("insert");
        db.upsert_prospect(&sample_prospect(
            "p3",
            "user-1",
            "converted",
            "2024-03-10T10:00:00+00:00",
        ))
        .expect("insert");
        db.upsert_prospect(&sample_prospect(
            "p4",
            "user-2",
            "converted",
            "2024-05-03T10:00:00+00:00",
        ))
        .expect("insert");

        let user = UserId::new("user-1");
        let this_month = db
            .count_prospects_created_since(&user, date(2024, 5, 1))
            .expect("count");
        assert_eq!(this_month, 2, "March prospect is outside the month");

        let converted = db.count_prospects_converted(&user).expect("count");
        assert_eq!(converted, 2, "conversion count is not month-scoped");
    }

    #[test]
    fn test_set_prospect_status_enforces_owner() {
        let db = test_db();
        db.upsert_prospect(&sample_prospect(
            "p1",
            "user-1",
            "contacted",
            "2024-05-02T10:00:00+00:00",
        ))
        .expect("insert");

        let intruder = UserId::new("user-2");
        assert!(!db
            .set_prospect_status(&intruder, "p1", "converted")
            .expect("call"));

        let owner = UserId::new("user-1");
        assert!(db
            .set_prospect_status(&owner, "p1", "converted")
            .expect("call"));
        assert_eq!(db.count_prospects_converted(&owner).expect("count"), 1);
    }

    #[test]
    fn test_get_user_implementations_owner_filter() {
        let db = test_db();
        db.upsert_implementation(&sample_implementation("i1", "user-1", Some(500.0)))
            .expect("insert");
        db.upsert_implementation(&sample_implementation("i2", "user-1", None))
            .expect("insert");
        db.upsert_implementation(&sample_implementation("i3", "user-2", Some(900.0)))
            .expect("insert");

        let user = UserId::new("user-1");
        let rows = db.get_user_implementations(&user).expect("query");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|imp| imp.user_id == "user-1"));
        assert_eq!(rows[0].recurring_amount, Some(500.0));
        assert_eq!(rows[1].recurring_amount, None);
    }

    #[test]
    fn test_upsert_implementation_updates_existing() {
        let db = test_db();
        let mut imp = sample_implementation("i1", "user-1", Some(500.0));
        db.upsert_implementation(&imp).expect("first upsert");

        imp.recurring_amount = Some(750.0);
        imp.status = "paused".to_string();
        db.upsert_implementation(&imp).expect("second upsert");

        let user = UserId::new("user-1");
        let rows = db.get_user_implementations(&user).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recurring_amount, Some(750.0));
        assert_eq!(rows[0].status, "paused");
    }

    #[test]
    fn test_set_implementation_delivered_enforces_owner() {
        let db = test_db();
        db.upsert_implementation(&sample_implementation("i1", "user-1", Some(500.0)))
            .expect("insert");

        let intruder = UserId::new("user-2");
        assert!(!db
            .set_implementation_delivered(&intruder, "i1", true)
            .expect("call"));

        let owner = UserId::new("user-1");
        assert!(db
            .set_implementation_delivered(&owner, "i1", true)
            .expect("call"));

        let rows = db.get_user_implementations(&owner).expect("query");
        assert!(rows[0].delivered);
    }
}
