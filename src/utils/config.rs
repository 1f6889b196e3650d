//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    db_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                db_filename: format!("{pkg}.db"),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Default store file name, relative to the working directory.
    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Index run defaults ----

/// Bucket used when the caller gives none.
pub const DEFAULT_BUCKET: &str = "default";

/// Digester count when the caller gives none.
pub const DEFAULT_PARALLELISM: usize = 4;

/// Path and entry channel capacity. Bounds how far the walker runs ahead of the digesters.
pub const DEFAULT_CHANNEL_CAP: usize = 16;

/// How often the writer wakes up to check the interrupt flag while waiting for entries.
pub const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Database ----

/// How long a transaction waits on a locked store before failing.
pub const STORE_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);
