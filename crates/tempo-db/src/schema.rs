//! Schema definition and versioning.
//!
//! The schema version lives in `PRAGMA user_version`. Each entry of
//! [`MIGRATIONS`] upgrades the schema by exactly one version and runs inside
//! its own transaction.

use rusqlite::Connection;

use crate::DbError;

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: i64 = 1;

/// Migration scripts, indexed by `target_version - 1`.
///
/// Timestamps: `*_ms` columns hold epoch milliseconds (UTC).
/// Dates: `created_on` holds an ISO 8601 date (`YYYY-MM-DD`).
/// Enums: `goal_type` and `period` hold stable variant names.
const MIGRATIONS: &[&str] = &["
    CREATE TABLE activity_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL
    );

    CREATE TABLE time_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        activity_id INTEGER NOT NULL,
        start_ms INTEGER NOT NULL,
        end_ms INTEGER,
        note TEXT,
        CHECK (end_ms IS NULL OR end_ms >= start_ms),
        FOREIGN KEY (activity_id) REFERENCES activity_types(id) ON DELETE CASCADE
    );

    CREATE INDEX idx_time_entries_start ON time_entries(start_ms);
    CREATE INDEX idx_time_entries_activity ON time_entries(activity_id);
    -- At most one running entry.
    CREATE UNIQUE INDEX idx_time_entries_running
        ON time_entries((end_ms IS NULL)) WHERE end_ms IS NULL;

    CREATE TABLE tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE time_entry_tags (
        entry_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        PRIMARY KEY (entry_id, tag_id),
        FOREIGN KEY (entry_id) REFERENCES time_entries(id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
    );

    CREATE INDEX idx_time_entry_tags_tag ON time_entry_tags(tag_id);

    CREATE TABLE goals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        activity_id INTEGER NOT NULL,
        goal_type TEXT NOT NULL,
        period TEXT NOT NULL,
        target_ms INTEGER NOT NULL CHECK (target_ms > 0),
        created_on TEXT NOT NULL,
        FOREIGN KEY (activity_id) REFERENCES activity_types(id) ON DELETE CASCADE
    );

    CREATE INDEX idx_goals_activity ON goals(activity_id);
"];

/// Returns the full DDL of the current schema, one section per version.
///
/// Intended for checking schema changes into version control.
pub fn schema_sql() -> String {
    let mut sql = String::new();
    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        sql.push_str(&format!("-- version {}\n", idx + 1));
        for line in migration.lines() {
            let line = line.trim();
            if !line.is_empty() {
                sql.push_str(line);
                sql.push('\n');
            }
        }
    }
    sql
}

/// Reads the stored schema version.
pub fn schema_version(conn: &Connection) -> Result<i64, DbError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Brings the schema up to [`SCHEMA_VERSION`].
///
/// Fails without touching the database when it was written by a newer build.
pub(crate) fn migrate(conn: &mut Connection) -> Result<(), DbError> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let pending = (1_i64..)
        .zip(MIGRATIONS.iter())
        .filter(|(target, _)| *target > found);
    for (target, migration) in pending {
        tracing::debug!(from = target - 1, to = target, "migrating schema");
        let tx = conn.transaction()?;
        tx.execute_batch(migration)?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
    }
    Ok(())
}
