//! Index runs: open the store, bring the schema up to date, then index each root in turn.

use log::{debug, info, warn};
use rusqlite::Connection;
use std::path::Path;

use crate::engine::db_ops::{self, DrainParams};
use crate::engine::progress::{finish_progress, progress_callback, setup_progress};
use crate::engine::tools::store_files;
use crate::error::IndexError;
use crate::pipeline::{PathFilter, PipelineOpts, PipelineTuning, RootRunOpts, index_root};
use crate::{IndexOpts, MigrateDirection, RootStats};

/// Apply the run's migration directive. `Down` resets the store (roll back, then up again).
fn prepare_schema(
    conn: &mut Connection,
    direction: Option<MigrateDirection>,
) -> Result<(), IndexError> {
    if direction == Some(MigrateDirection::Down) {
        let reverted = db_ops::migrate_down(conn)?;
        warn!("Store reset: {} migration(s) rolled back, all rows dropped", reverted);
    }
    db_ops::migrate_up(conn)?;
    Ok(())
}

/// Index `roots` into the store at `opts.db_path`, creating it if needed.
///
/// Patterns are compiled before the store is touched, so a bad pattern never creates a file.
/// Roots run one after another; the first root that fails stops the run and its error is
/// returned. Rows committed before the failure stay in the store.
pub fn index_roots<P: AsRef<Path>>(
    roots: &[P],
    opts: &IndexOpts,
) -> Result<Vec<RootStats>, IndexError> {
    if roots.is_empty() {
        return Err(IndexError::NoRoots);
    }
    let filter = PathFilter::new(&opts.accept, &opts.reject)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let mut conn = db_ops::open_store(&opts.db_path)?;
    prepare_schema(&mut conn, opts.migrate)?;
    run_roots(&mut conn, roots, opts, filter)
}

/// Same as [`index_roots`] on a connection the caller already opened (and migrated).
pub fn index_roots_into<P: AsRef<Path>>(
    conn: &mut Connection,
    roots: &[P],
    opts: &IndexOpts,
) -> Result<Vec<RootStats>, IndexError> {
    if roots.is_empty() {
        return Err(IndexError::NoRoots);
    }
    let filter = PathFilter::new(&opts.accept, &opts.reject)?;
    run_roots(conn, roots, opts, filter)
}

fn run_roots<P: AsRef<Path>>(
    conn: &mut Connection,
    roots: &[P],
    opts: &IndexOpts,
    filter: PathFilter,
) -> Result<Vec<RootStats>, IndexError> {
    let pipeline_opts = PipelineOpts {
        bucket: opts.bucket.clone(),
        filter,
        skip: store_files(&opts.db_path),
        tuning: PipelineTuning::resolve(opts.parallelism, opts.channel_cap),
    };

    let bar = setup_progress(opts.progress);
    let on_stored = progress_callback(&bar);
    let run = RootRunOpts {
        strict: opts.strict,
        drain: DrainParams {
            interrupt: opts.interrupt.as_deref(),
            on_stored: on_stored.as_deref(),
        },
    };

    let mut all = Vec::with_capacity(roots.len());
    let mut outcome = Ok(());
    for root in roots {
        match index_root(conn, root.as_ref(), &pipeline_opts, &run) {
            Ok(stats) => all.push(stats),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }
    finish_progress(&bar);

    if let Err(e) = db_ops::checkpoint(conn) {
        warn!("WAL checkpoint failed: {}", e);
    }
    outcome?;

    let stored: usize = all.iter().map(|s| s.stored).sum();
    info!("Indexed {} root(s), {} entries stored", all.len(), stored);
    Ok(all)
}
