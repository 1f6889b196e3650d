//! Public and internal types for the dedup API and pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::error::DigestError;
use crate::utils::config::{DEFAULT_BUCKET, DEFAULT_CHANNEL_CAP, DEFAULT_PARALLELISM, PackagePaths};

/// One digested file. Created once by a digester, consumed once by the writer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// File path as indexed (opaque identity).
    pub path: String,
    /// Hex-encoded BLAKE3 digest of the content.
    pub hash: String,
    /// Run label; not part of the row identity.
    pub bucket: String,
    /// Number of bytes hashed.
    pub size: u64,
}

impl Entry {
    /// Compact JSON form used in log lines.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What a digester emits for one path: the entry, or why it could not be produced.
pub type Digested = Result<Entry, DigestError>;

/// Direction for the schema migration directive of an index run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrateDirection {
    Up,
    Down,
}

/// Options for [`index_roots`](crate::index::index_roots).
#[derive(Clone, Debug)]
pub struct IndexOpts {
    /// Store location.
    pub db_path: PathBuf,
    /// Label given to every entry of this run.
    pub bucket: String,
    /// Digester count. `0` means one per available thread.
    pub parallelism: usize,
    /// Regexes a path must match (any of) to be digested. Empty admits everything.
    pub accept: Vec<String>,
    /// Regexes that exclude a path. Reject wins over accept.
    pub reject: Vec<String>,
    /// Migration directive applied before indexing.
    pub migrate: Option<MigrateDirection>,
    /// Strict mode: a digest or persist error fails the root instead of being skipped.
    pub strict: bool,
    /// Capacity of the path and entry channels (0 = rendezvous).
    pub channel_cap: usize,
    /// Show a counter of stored entries.
    pub progress: bool,
    /// Raised by the Ctrl+C handler; polled by the writer.
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for IndexOpts {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(PackagePaths::get().db_filename()),
            bucket: DEFAULT_BUCKET.to_string(),
            parallelism: DEFAULT_PARALLELISM,
            accept: Vec::new(),
            reject: Vec::new(),
            migrate: None,
            strict: false,
            channel_cap: DEFAULT_CHANNEL_CAP,
            progress: false,
            interrupt: None,
        }
    }
}

/// Counters for one finished root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootStats {
    pub root: PathBuf,
    /// Paths the walker handed to the digesters.
    pub walked: usize,
    /// Entries committed to the store.
    pub stored: usize,
    /// Files that could not be read.
    pub digest_errors: usize,
    /// Entries whose transaction failed.
    pub persist_errors: usize,
}
