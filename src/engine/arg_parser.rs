use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::MigrateDirection;
use crate::utils::logger::{LogFormat, LogLevel, LogStream};

/// Duplicate file indexer: digest directory trees into a SQLite store and query it.
#[derive(Clone, Parser)]
#[command(name = "dedup", version)]
#[command(about = "Index file contents into SQLite and find duplicates.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity for this program.
    #[arg(long, short = 'L', global = true, env = "DEDUP_LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Where log lines go.
    #[arg(long, short = 'S', global = true, value_enum)]
    pub log_stream: Option<LogStream>,

    /// Log line format.
    #[arg(long, short = 'F', global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Config file. Default: `.dedup.toml` in the working directory, if present.
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Walk directories and store one row per (hash, path).
    #[command(visible_aliases = ["idx", "i"])]
    Index(IndexArgs),

    /// Run SQL against the store and print each result as a table.
    #[command(visible_aliases = ["qry", "q"])]
    Query(QueryArgs),

    /// Print build information.
    #[command(visible_aliases = ["ver", "v"])]
    Version(VersionArgs),
}

/// Migration directive for `index --migrate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MigrateArg {
    /// Apply pending migrations (always done anyway).
    Up,
    /// Roll every migration back, then re-apply: empties the store.
    Down,
}

impl From<MigrateArg> for MigrateDirection {
    fn from(arg: MigrateArg) -> Self {
        match arg {
            MigrateArg::Up => MigrateDirection::Up,
            MigrateArg::Down => MigrateDirection::Down,
        }
    }
}

/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Clone, Args)]
pub struct IndexArgs {
    /// Directories to index, in order.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub roots: Vec<PathBuf>,

    /// Store file. Default: `./dedup.db`.
    #[arg(long, short = 'd')]
    pub database: Option<PathBuf>,

    /// Label stored with every entry of this run.
    #[arg(long, short = 'b')]
    pub bucket: Option<String>,

    /// Digester threads (0 = one per available thread).
    #[arg(long, short = 'p')]
    pub parallelism: Option<usize>,

    /// Only digest paths matching at least one of these regexes. Repeatable.
    #[arg(long, short = 'a', value_name = "REGEX")]
    pub accept: Vec<String>,

    /// Never digest paths matching any of these regexes. Repeatable.
    #[arg(long, short = 'r', value_name = "REGEX")]
    pub reject: Vec<String>,

    /// Schema migration to apply before indexing.
    #[arg(long, value_enum)]
    pub migrate: Option<MigrateArg>,

    /// Fail the root on the first unreadable file or failed insert.
    #[arg(long)]
    pub strict: bool,

    /// Capacity of the path and entry channels.
    #[arg(long)]
    pub channel_cap: Option<usize>,

    /// Show a counter of stored entries.
    #[arg(long)]
    pub progress: bool,
}

#[derive(Clone, Args)]
pub struct QueryArgs {
    /// SQL statements, each rendered as its own table.
    #[arg(value_name = "SQL", num_args = 0..)]
    pub queries: Vec<String>,

    /// Store file. Default: `./dedup.db`.
    #[arg(long, short = 'd')]
    pub database: Option<PathBuf>,

    /// Also list hashes stored under more than one path.
    #[arg(long)]
    pub duplicates: bool,
}

#[derive(Clone, Args)]
pub struct VersionArgs {
    /// Multi-line output with license, repository and build details.
    #[arg(long)]
    pub verbose: bool,

    /// JSON output.
    #[arg(long, conflicts_with = "verbose")]
    pub json: bool,
}
