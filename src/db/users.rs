use rusqlite::params;

use super::*;

impl WorkspaceDb {
    // =========================================================================
    // Users
    // =========================================================================

    /// Helper: map a row to `DbUser`.
    pub(crate) fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbUser> {
        Ok(DbUser {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    /// Insert or update a user.
    pub fn upsert_user(&self, user: &DbUser) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO users (id, email, name, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name",
            params![user.id, user.email, user.name, user.created_at],
        )?;
        Ok(())
    }

    /// Get a user by email (case-insensitive).
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, name, created_at
             FROM users WHERE LOWER(email) = LOWER(?1)",
        )?;
        let mut rows = stmt.query_map(params![email], Self::map_user_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
