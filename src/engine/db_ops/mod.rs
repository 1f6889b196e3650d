//! Database operations: open, migrations, single-writer upserts, queries.

mod connection;
mod migrate;
mod query;
mod writer;

pub use connection::{checkpoint, open_existing_store, open_store, open_store_in_memory};
pub use migrate::{MIGRATIONS, Migration, migrate, migrate_down, migrate_up, schema_version};
pub use query::{DuplicateGroup, QueryTable, duplicate_groups, duplicates_table, run_query};
pub use writer::{DrainEnd, DrainParams, IndexWriter, WriterStats, drain_entries};

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        PRAGMA foreign_keys = ON;
        "#;

/// Upsert for the entries table: same `(hash, path)` overwrites bucket, size, dir and name.
/// Nothing removes stale rows: a file whose content changed keeps its old `(hash, path)` row
/// next to the new one.
pub const UPSERT_ENTRY_SQL: &str =
    "INSERT OR REPLACE INTO entries (hash, path, dir, name, bucket, size) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Hashes shared by more than one row, largest groups first.
pub const DUPLICATES_SQL: &str = r#"
SELECT hash, COUNT(*) AS count, MAX(size) AS size
FROM entries
GROUP BY hash
HAVING COUNT(*) > 1
ORDER BY count DESC, hash
"#;
