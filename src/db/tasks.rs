use chrono::{NaiveDate, Utc};
use rusqlite::params;

use super::*;
use crate::auth::UserId;
use crate::policy;
use crate::recurrence::parse_stored_date;

impl WorkspaceDb {
    // =========================================================================
    // Tasks
    // =========================================================================

    /// Helper: map a row to `DbTask`.
    pub(crate) fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbTask> {
        Ok(DbTask {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            scheduled_date: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            completed_at: row.get(7)?,
        })
    }

    /// Insert or update a task.
    pub fn upsert_task(&self, task: &DbTask) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO tasks (
                id, user_id, title, scheduled_date, status,
                created_at, updated_at, completed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                scheduled_date = excluded.scheduled_date,
                status = excluded.status,
                updated_at = excluded.updated_at,
                completed_at = excluded.completed_at",
            params![
                task.id,
                task.user_id,
                task.title,
                task.scheduled_date,
                task.status,
                task.created_at,
                task.updated_at,
                task.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<DbTask>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, scheduled_date, status,
                    created_at, updated_at, completed_at
             FROM tasks WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_task_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Update a task's status. Sets `completed_at` when the task moves to
    /// completed and clears it otherwise. Returns false when the task does
    /// not exist or the requester does not own it.
    pub fn set_task_status(
        &self,
        requester: &UserId,
        task_id: &str,
        status: &str,
    ) -> Result<bool, DbError> {
        let Some(task) = self.get_task(task_id)? else {
            return Ok(false);
        };
        if !policy::can_access(requester, &task) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        let completed_at = (status == "completed").then(|| now.clone());
        self.conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![status, completed_at, now, task_id],
        )?;
        Ok(true)
    }

    /// Count the user's tasks scheduled on a given date.
    pub fn count_tasks_scheduled_on(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND scheduled_date = ?2",
            params![user.as_str(), date.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Count the user's tasks completed on a given date.
    pub fn count_tasks_completed_on(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND scheduled_date = ?2 AND status = 'completed'",
            params![user.as_str(), date.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Count the user's tasks completed within `[start, end]` (inclusive).
    pub fn count_tasks_completed_between(
        &self,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND status = 'completed'
               AND scheduled_date >= ?2 AND scheduled_date <= ?3",
            params![user.as_str(), start.to_string(), end.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Scheduled dates of the user's completed tasks within `[start, end]`,
    /// ordered ascending. Rows with a malformed stored date are skipped.
    pub fn completed_task_dates(
        &self,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT scheduled_date FROM tasks
             WHERE user_id = ?1 AND status = 'completed'
               AND scheduled_date >= ?2 AND scheduled_date <= ?3
             ORDER BY scheduled_date",
        )?;
        let rows = stmt.query_map(
            params![user.as_str(), start.to_string(), end.to_string()],
            |row| row.get::<_, String>(0),
        )?;

        let mut dates = Vec::new();
        for row in rows {
            if let Some(date) = parse_stored_date(&row?) {
                dates.push(date);
            }
        }
        Ok(dates)
    }
}
