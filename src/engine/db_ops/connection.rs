//! Open the index store.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::error::IndexError;
use crate::utils::config::STORE_BUSY_TIMEOUT;

use super::WAL_PRAGMAS;

/// Enable WAL, tuning pragmas and the busy timeout on an open connection (idempotent).
fn apply_wal(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    conn.execute_batch(WAL_PRAGMAS)?;
    conn.busy_timeout(STORE_BUSY_TIMEOUT)?;
    Ok(())
}

fn store_error(path: &Path) -> impl FnOnce(rusqlite::Error) -> IndexError + '_ {
    move |source| IndexError::Store {
        path: path.to_path_buf(),
        source,
    }
}

/// Open or create the store at `path` with WAL. Schema is left to [`migrate_up`](super::migrate_up).
pub fn open_store(path: &Path) -> Result<Connection, IndexError> {
    let conn = Connection::open(path).map_err(store_error(path))?;
    apply_wal(&conn).map_err(store_error(path))?;
    Ok(conn)
}

/// Open a store that must already exist (query command). Never creates a file.
pub fn open_existing_store(path: &Path) -> Result<Connection, IndexError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(store_error(path))?;
    apply_wal(&conn).map_err(store_error(path))?;
    Ok(conn)
}

/// Open an in-memory store (tests and throwaway runs; no WAL).
pub fn open_store_in_memory() -> Result<Connection, IndexError> {
    Connection::open_in_memory().map_err(store_error(Path::new(":memory:")))
}

/// Fold the WAL back into the main file after a run.
pub fn checkpoint(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
}
