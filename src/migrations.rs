//! Embedded schema migrations.
//!
//! Migration SQL is compiled into the binary as a numbered sequence and
//! tracked per database in the `schema_version` table, so every step runs
//! exactly once. A file written by a newer build is refused outright rather
//! than half-upgraded, and a hot backup of the database file is taken before
//! any pending step runs.

use rusqlite::backup::Backup;
use rusqlite::Connection;

/// Numbered migration steps, ascending. Append new steps; never edit a
/// shipped one.
const STEPS: &[(i32, &str)] = &[(1, include_str!("migrations/001_baseline.sql"))];

/// Highest migration version recorded for this database, 0 for a fresh file.
/// Creates the tracking table on first contact.
fn applied_version(conn: &Connection) -> Result<i32, String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {e}"))?;

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {e}"))
}

/// Hot-copy the database to `<path>.pre-migration.bak` via the online backup
/// API. In-memory and temp databases have no file to copy and are skipped.
fn backup_database(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to resolve database path: {e}"))?;
    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{db_path}.pre-migration.bak");
    let mut target = Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {e}"))?;
    let backup = Backup::new(conn, &mut target)
        .map_err(|e| format!("Failed to start pre-migration backup: {e}"))?;
    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {e}"))?;

    log::info!("Pre-migration backup written to {backup_path}");
    Ok(())
}

/// Bring the database up to the latest schema.
///
/// Returns the number of steps applied; 0 means the file was already current.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    let current = applied_version(conn)?;
    let latest = STEPS.last().map(|(version, _)| *version).unwrap_or(0);

    if current > latest {
        return Err(format!(
            "Database schema version ({current}) is newer than this build of Revboard \
             supports ({latest}). Update Revboard before opening this file."
        ));
    }
    if current == latest {
        return Ok(0);
    }

    backup_database(conn)?;

    let mut applied = 0;
    for (version, sql) in STEPS {
        let version = *version;
        if version <= current {
            continue;
        }
        conn.execute_batch(sql)
            .map_err(|e| format!("Migration v{version} failed: {e}"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| format!("Failed to record migration v{version}: {e}"))?;
        log::info!("Applied schema migration v{version}");
        applied += 1;
    }
    Ok(applied)
}
