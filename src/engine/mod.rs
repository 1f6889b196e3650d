//! Engine: CLI, handlers, store operations, hashing and path helpers.

pub mod arg_parser;
pub mod cli;
pub mod db_ops;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod table;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands};
pub use cli::handle_run;
pub use db_ops::{
    IndexWriter, QueryTable, checkpoint, duplicate_groups, migrate, open_existing_store,
    open_store, open_store_in_memory, run_query,
};
pub use hashing::{hash_bytes, hash_file};
pub use tools::{path_to_db_string, split_dir_name, store_files};
