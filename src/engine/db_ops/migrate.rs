//! Versioned schema steps tracked with `PRAGMA user_version`.

use log::info;
use rusqlite::Connection;

use crate::MigrateDirection;
use crate::error::IndexError;

/// One schema step. `down` undoes `up` and brings the store back to `version - 1`.
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// All schema steps, in order. `IF NOT EXISTS` keeps step 1 safe on stores created before
/// versioning was tracked.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create entries table and hash index",
    up: r#"
CREATE TABLE IF NOT EXISTS entries (
    hash   TEXT NOT NULL,
    path   TEXT NOT NULL,
    dir    TEXT,
    name   TEXT,
    bucket TEXT,
    size   INTEGER,
    PRIMARY KEY (hash, path)
);
CREATE INDEX IF NOT EXISTS idx_entries_hash ON entries (hash);
"#,
    down: r#"
DROP INDEX IF EXISTS idx_entries_hash;
DROP TABLE IF EXISTS entries;
"#,
}];

pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Run `sql` and set the version in one transaction.
fn apply_step(conn: &mut Connection, sql: &str, new_version: i64) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", new_version)?;
    tx.commit()
}

fn current_version(conn: &Connection) -> Result<i64, IndexError> {
    schema_version(conn).map_err(|source| IndexError::Migration { version: 0, source })
}

/// Apply every step above the current version. Returns how many were applied.
pub fn migrate_up(conn: &mut Connection) -> Result<usize, IndexError> {
    let current = current_version(conn)?;
    let mut applied = 0;
    for m in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply_step(conn, m.up, m.version).map_err(|source| IndexError::Migration {
            version: m.version,
            source,
        })?;
        info!("Applied migration {} ({})", m.version, m.description);
        applied += 1;
    }
    Ok(applied)
}

/// Undo every applied step, newest first. Drops all indexed rows.
pub fn migrate_down(conn: &mut Connection) -> Result<usize, IndexError> {
    let current = current_version(conn)?;
    let mut reverted = 0;
    for m in MIGRATIONS.iter().rev().filter(|m| m.version <= current) {
        apply_step(conn, m.down, m.version - 1).map_err(|source| IndexError::Migration {
            version: m.version - 1,
            source,
        })?;
        info!("Reverted migration {} ({})", m.version, m.description);
        reverted += 1;
    }
    Ok(reverted)
}

pub fn migrate(conn: &mut Connection, direction: MigrateDirection) -> Result<usize, IndexError> {
    match direction {
        MigrateDirection::Up => migrate_up(conn),
        MigrateDirection::Down => migrate_down(conn),
    }
}
