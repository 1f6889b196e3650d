//! Single writer: drain digested entries into the store, one transaction per entry.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, warn};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::tools::split_dir_name;
use crate::error::{IndexError, PersistError};
use crate::utils::config::INTERRUPT_POLL_INTERVAL;
use crate::{Digested, Entry};

use super::UPSERT_ENTRY_SQL;

/// Counters kept by [`IndexWriter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub received: usize,
    pub stored: usize,
    pub digest_errors: usize,
    pub persist_errors: usize,
}

/// Owns the store connection for the duration of a root. Only this type writes rows.
pub struct IndexWriter<'c> {
    conn: &'c mut Connection,
    strict: bool,
    stats: WriterStats,
}

fn upsert_entry(conn: &mut Connection, entry: &Entry) -> rusqlite::Result<()> {
    let (dir, name) = split_dir_name(Path::new(&entry.path));
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(UPSERT_ENTRY_SQL)?;
        stmt.execute(params![
            entry.hash,
            entry.path,
            dir,
            name,
            entry.bucket,
            entry.size as i64
        ])?;
    }
    tx.commit()
}

impl<'c> IndexWriter<'c> {
    pub fn new(conn: &'c mut Connection, strict: bool) -> Self {
        Self {
            conn,
            strict,
            stats: WriterStats::default(),
        }
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Upsert one entry in its own transaction. A failure rolls back only this entry.
    pub fn store(&mut self, entry: &Entry) -> Result<(), PersistError> {
        upsert_entry(self.conn, entry).map_err(|source| PersistError {
            path: entry.path.clone(),
            source,
        })
    }

    /// Handle one message from the digesters. Returns `Ok(true)` when a row was committed.
    /// Per-item errors are logged and counted; they are returned only in strict mode.
    pub fn accept(&mut self, item: Digested) -> Result<bool, IndexError> {
        self.stats.received += 1;
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                self.stats.digest_errors += 1;
                warn!("{}", err);
                return if self.strict { Err(err.into()) } else { Ok(false) };
            }
        };
        match self.store(&entry) {
            Ok(()) => {
                self.stats.stored += 1;
                debug!("stored {}", entry.to_json());
                Ok(true)
            }
            Err(err) => {
                self.stats.persist_errors += 1;
                error!("{}", err);
                if self.strict { Err(err.into()) } else { Ok(false) }
            }
        }
    }
}

/// Extras for [`drain_entries`].
#[derive(Default)]
pub struct DrainParams<'a> {
    /// Checked between entries and while idle; raising it stops the drain.
    pub interrupt: Option<&'a AtomicBool>,
    /// Called with 1 after every committed row.
    pub on_stored: Option<&'a (dyn Fn(usize) + Send)>,
}

/// Why [`drain_entries`] stopped.
#[derive(Debug)]
pub enum DrainEnd {
    /// Every digester exited and the channel is empty.
    Closed,
    /// The interrupt flag was raised.
    Interrupted,
    /// Strict mode hit a per-item error.
    Failed(IndexError),
}

fn interrupted(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Receive until the channel closes, an interrupt is raised, or (strict) an item fails.
/// Committed rows stay committed whichever way this ends.
pub fn drain_entries(
    writer: &mut IndexWriter<'_>,
    entry_rx: &Receiver<Digested>,
    params: &DrainParams<'_>,
) -> DrainEnd {
    loop {
        if interrupted(params.interrupt) {
            return DrainEnd::Interrupted;
        }
        let item = if params.interrupt.is_some() {
            match entry_rx.recv_timeout(INTERRUPT_POLL_INTERVAL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return DrainEnd::Closed,
            }
        } else {
            match entry_rx.recv() {
                Ok(item) => item,
                Err(_) => return DrainEnd::Closed,
            }
        };
        match writer.accept(item) {
            Ok(true) => {
                if let Some(cb) = params.on_stored {
                    cb(1);
                }
            }
            Ok(false) => {}
            Err(err) => return DrainEnd::Failed(err),
        }
    }
}
