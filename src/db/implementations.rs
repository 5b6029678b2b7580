use chrono::Utc;
use rusqlite::params;

use super::*;
use crate::auth::UserId;
use crate::policy;

impl WorkspaceDb {
    // =========================================================================
    // Implementations
    // =========================================================================

    /// Helper: map a row to `DbImplementation`.
    pub(crate) fn map_implementation_row(
        row: &rusqlite::Row<'_>,
    ) -> rusqlite::Result<DbImplementation> {
        Ok(DbImplementation {
            id: row.get(0)?,
            user_id: row.get(1)?,
            client_name: row.get(2)?,
            recurring_amount: row.get(3)?,
            status: row.get(4)?,
            start_date: row.get(5)?,
            end_date: row.get(6)?,
            delivered: row.get::<_, i32>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    /// Insert or update an implementation.
    pub fn upsert_implementation(&self, imp: &DbImplementation) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO implementations (
                id, user_id, client_name, recurring_amount, status,
                start_date, end_date, delivered, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                client_name = excluded.client_name,
                recurring_amount = excluded.recurring_amount,
                status = excluded.status,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                delivered = excluded.delivered,
                updated_at = excluded.updated_at",
            params![
                imp.id,
                imp.user_id,
                imp.client_name,
                imp.recurring_amount,
                imp.status,
                imp.start_date,
                imp.end_date,
                imp.delivered as i32,
                imp.created_at,
                imp.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get an implementation by ID.
    pub fn get_implementation(&self, id: &str) -> Result<Option<DbImplementation>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, client_name, recurring_amount, status,
                    start_date, end_date, delivered, created_at, updated_at
             FROM implementations WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_implementation_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Mark an implementation's deliverable as complete (or not). Returns
    /// false when the row does not exist or the requester does not own it.
    pub fn set_implementation_delivered(
        &self,
        requester: &UserId,
        implementation_id: &str,
        delivered: bool,
    ) -> Result<bool, DbError> {
        let Some(imp) = self.get_implementation(implementation_id)? else {
            return Ok(false);
        };
        if !policy::can_access(requester, &imp) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE implementations SET delivered = ?1, updated_at = ?2 WHERE id = ?3",
            params![delivered as i32, now, implementation_id],
        )?;
        Ok(true)
    }

    /// All implementations owned by the user, ordered by client name.
    /// No further filtering — eligibility for a given month is decided by
    /// the recurrence evaluator over the returned rows.
    pub fn get_user_implementations(
        &self,
        user: &UserId,
    ) -> Result<Vec<DbImplementation>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, client_name, recurring_amount, status,
                    start_date, end_date, delivered, created_at, updated_at
             FROM implementations WHERE user_id = ?1 ORDER BY client_name",
        )?;
        let rows = stmt.query_map(params![user.as_str()], Self::map_implementation_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
