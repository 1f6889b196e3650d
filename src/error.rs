//! Error taxonomy for an index run.
//!
//! Configuration problems ([`IndexError::Pattern`], [`IndexError::Store`]) are raised before any
//! traversal starts. A [`WalkError`] fails the current root and stops the run. [`DigestError`] and
//! [`PersistError`] are per-item: logged and skipped, unless the run is strict.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which filter list a pattern came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Accept,
    Reject,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Accept => f.write_str("accept"),
            PatternKind::Reject => f.write_str("reject"),
        }
    }
}

/// Errors that end an index run (or, for strict runs, a root).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no paths provided")]
    NoRoots,

    #[error("invalid {kind} pattern '{pattern}': {source}")]
    Pattern {
        kind: PatternKind,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot open store at {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema migration to version {version} failed: {source}")]
    Migration {
        version: i64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("error walking directory tree at {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: WalkError,
    },

    #[error("strict mode: {0}")]
    Digest(#[from] DigestError),

    #[error("strict mode: {0}")]
    Persist(#[from] PersistError),

    #[error("indexing of {} interrupted; committed entries were kept", root.display())]
    Interrupted { root: PathBuf },
}

/// Terminal error of a directory walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("cannot access root: {0}")]
    Root(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] walkdir::Error),

    #[error("walk canceled")]
    Cancelled,

    #[error("walk thread panicked")]
    Panicked,
}

/// A file that could not be opened or read while digesting.
#[derive(Debug, Error)]
#[error("error digesting {path}: {source}")]
pub struct DigestError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// A transaction (begin, prepare, exec or commit) that failed for one entry.
#[derive(Debug, Error)]
#[error("error storing {path} into the index: {source}")]
pub struct PersistError {
    pub path: String,
    #[source]
    pub source: rusqlite::Error,
}

impl IndexError {
    /// True for errors raised before any root was touched.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            IndexError::NoRoots | IndexError::Pattern { .. } | IndexError::Store { .. }
        )
    }
}
