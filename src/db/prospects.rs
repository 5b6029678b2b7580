use chrono::{NaiveDate, Utc};
use rusqlite::params;

use super::*;
use crate::auth::UserId;
use crate::policy;

impl WorkspaceDb {
    // =========================================================================
    // Prospects
    // =========================================================================

    /// Helper: map a row to `DbProspect`.
    pub(crate) fn map_prospect_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbProspect> {
        Ok(DbProspect {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// Insert or update a prospect.
    pub fn upsert_prospect(&self, prospect: &DbProspect) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO prospects (id, user_id, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                updated_at = excluded.updated_at",
            params![
                prospect.id,
                prospect.user_id,
                prospect.name,
                prospect.status,
                prospect.created_at,
                prospect.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a prospect by ID.
    pub fn get_prospect(&self, id: &str) -> Result<Option<DbProspect>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, status, created_at, updated_at
             FROM prospects WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_prospect_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Update a prospect's status. Returns false when the prospect does not
    /// exist or the requester does not own it.
    pub fn set_prospect_status(
        &self,
        requester: &UserId,
        prospect_id: &str,
        status: &str,
    ) -> Result<bool, DbError> {
        let Some(prospect) = self.get_prospect(prospect_id)? else {
            return Ok(false);
        };
        if !policy::can_access(requester, &prospect) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE prospects SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, now, prospect_id],
        )?;
        Ok(true)
    }

    /// Count the user's prospects created on or after `month_start`.
    ///
    /// `created_at` is stored as RFC 3339; comparing against the bare
    /// `YYYY-MM-DD` lower bound works because both share the date prefix.
    pub fn count_prospects_created_since(
        &self,
        user: &UserId,
        month_start: NaiveDate,
    ) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM prospects WHERE user_id = ?1 AND created_at >= ?2",
            params![user.as_str(), month_start.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Count the user's converted prospects (all time).
    pub fn count_prospects_converted(&self, user: &UserId) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM prospects WHERE user_id = ?1 AND status = 'converted'",
            params![user.as_str()],
            |row| row.get(0),
        )?)
    }
}
