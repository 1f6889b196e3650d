//! Command handlers for index, query and version.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::IndexOpts;
use crate::engine::arg_parser::{IndexArgs, QueryArgs, VersionArgs};
use crate::engine::db_ops::{duplicates_table, open_existing_store, run_query};
use crate::index::index_roots;
use crate::utils::config::PackagePaths;
use crate::utils::dedup_toml::{DedupToml, apply_file_to_opts, file_database};
use crate::version::BuildInfo;

/// Defaults, then the config file, then explicit flags.
fn index_opts(args: &IndexArgs, file: Option<&DedupToml>) -> IndexOpts {
    let mut opts = IndexOpts::default();
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(ref db) = args.database {
        opts.db_path = db.clone();
    }
    if let Some(ref bucket) = args.bucket {
        opts.bucket = bucket.clone();
    }
    if let Some(p) = args.parallelism {
        opts.parallelism = p;
    }
    if !args.accept.is_empty() {
        opts.accept = args.accept.clone();
    }
    if !args.reject.is_empty() {
        opts.reject = args.reject.clone();
    }
    if let Some(cap) = args.channel_cap {
        opts.channel_cap = cap;
    }
    opts.migrate = args.migrate.map(Into::into);
    opts.strict |= args.strict;
    opts.progress |= args.progress;
    opts
}

/// Ctrl+C raises the returned flag; the writer polls it between entries.
fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;
    Ok(flag)
}

pub fn handle_index(args: &IndexArgs, file: Option<&DedupToml>) -> Result<()> {
    let mut opts = index_opts(args, file);
    opts.interrupt = Some(install_interrupt_handler()?);

    let stats = index_roots(&args.roots, &opts)
        .with_context(|| format!("indexing into {}", opts.db_path.display()))?;
    for s in &stats {
        debug!("{:?}", s);
    }
    let unreadable: usize = stats.iter().map(|s| s.digest_errors).sum();
    if unreadable > 0 {
        warn!("{} file(s) could not be read and were skipped", unreadable);
    }
    Ok(())
}

pub fn handle_query(args: &QueryArgs, file: Option<&DedupToml>) -> Result<()> {
    if !args.duplicates && args.queries.is_empty() {
        bail!("no queries provided");
    }

    let db_path: PathBuf = args
        .database
        .clone()
        .or_else(|| file.and_then(file_database))
        .unwrap_or_else(|| PathBuf::from(PackagePaths::get().db_filename()));
    let conn = open_existing_store(&db_path)?;

    if args.duplicates {
        info!("Running duplicates report");
        let table = duplicates_table(&conn).context("duplicates report failed")?;
        println!("{}", table);
    }
    for sql in &args.queries {
        info!("Running query: {}", sql.trim());
        let table = run_query(&conn, sql).with_context(|| format!("query failed: {}", sql.trim()))?;
        println!("{}", table);
    }
    Ok(())
}

pub fn handle_version(args: &VersionArgs) -> Result<()> {
    let info = BuildInfo::current();
    if args.json {
        println!("{}", info.to_json().context("serialize build info")?);
    } else if args.verbose {
        print!("{}", info.verbose());
    } else {
        println!("{}", info.short());
    }
    Ok(())
}
