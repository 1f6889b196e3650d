pub mod config;
pub mod dedup_toml;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, effective_parallelism, max_open_fds, max_workers_by_fd_limit};
pub use logger::{LogFormat, LogLevel, LogSettings, LogStream, setup_logging};
