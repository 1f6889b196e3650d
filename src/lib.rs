//! Dedup: content-addressed duplicate file indexer.
//!
//! Walks directory trees, digests every admitted file on a pool of worker threads, and upserts one
//! `(hash, path)` row per file into a SQLite store. Files sharing a hash are duplicates:
//!
//! ```ignore
//! let opts = dedup::IndexOpts { db_path: "photos.db".into(), ..Default::default() };
//! let stats = dedup::index_roots(&["/home/me/Pictures"], &opts)?;
//! ```

pub mod engine;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod version;

/// Re-export types for API
pub use types::*;

pub use error::{DigestError, IndexError, PersistError, WalkError};
pub use index::{index_roots, index_roots_into};
pub use pipeline::PathFilter;
