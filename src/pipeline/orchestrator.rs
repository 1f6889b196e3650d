use log::{debug, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::engine::db_ops::{DrainEnd, DrainParams, IndexWriter, drain_entries};
use crate::error::{IndexError, WalkError};
use crate::pipeline;
use crate::{Digested, RootStats};

use super::cancel::{CancelHandle, cancel_pair};
use super::context::PipelineOpts;
use super::walk::{WalkContext, WalkResult};

/// Handles returned by [`run_pipeline`]: receive from `entry_rx`, then call
/// [`PipelineHandles::shutdown`] to join every thread and get the walk's terminal result.
pub struct PipelineHandles {
    pub entry_rx: Receiver<Digested>,
    /// Per-root signal shared by the walker and the digesters.
    pub cancel: CancelHandle,
    pub walk_result_rx: Receiver<WalkResult>,
    pub walk_handle: JoinHandle<()>,
    /// Joins every digester; its exit is what closes the entry channel.
    pub watcher_handle: JoinHandle<usize>,
}

/// Start the walk + digest pipeline for one root: a fresh cancellation signal and
/// fresh channels, the walk thread, the digesters, and a watcher that waits for all of them.
pub fn run_pipeline(root: &Path, opts: &PipelineOpts) -> PipelineHandles {
    let (cancel, token) = cancel_pair();
    let channels = pipeline::create_pipeline_channels(opts.tuning.channel_cap);

    let walk_handle = pipeline::spawn_walk_thread(
        channels.path_tx,
        channels.walk_result_tx,
        WalkContext {
            root: root.to_path_buf(),
            filter: opts.filter.clone(),
            skip: opts.skip.clone(),
            cancel: token.clone(),
        },
    );

    let worker_handles = pipeline::spawn_digest_workers(
        &opts.bucket,
        channels.path_rx,
        &channels.entry_tx,
        &token,
        opts.tuning.num_threads,
    );

    // Dropping the last sender here means the entry channel closes when the last digester exits.
    drop(channels.entry_tx);

    let watcher_handle = spawn_completion_watcher(worker_handles);

    PipelineHandles {
        entry_rx: channels.entry_rx,
        cancel,
        walk_result_rx: channels.walk_result_rx,
        walk_handle,
        watcher_handle,
    }
}

/// Wait for every digester. Returns how many of them panicked.
fn spawn_completion_watcher(worker_handles: Vec<JoinHandle<()>>) -> JoinHandle<usize> {
    thread::spawn(move || {
        debug!("waiting for all digesters to complete...");
        let panicked = worker_handles
            .into_iter()
            .map(JoinHandle::join)
            .filter(Result::is_err)
            .count();
        debug!("all digesters done");
        panicked
    })
}

impl PipelineHandles {
    /// Stop and join the pipeline. Safe to call with entries still queued: the receiver and the
    /// cancellation signal are released first so no stage stays blocked on a send.
    pub fn shutdown(self) -> WalkResult {
        let PipelineHandles {
            entry_rx,
            cancel,
            walk_result_rx,
            walk_handle,
            watcher_handle,
            ..
        } = self;
        drop(entry_rx);
        drop(cancel);

        match watcher_handle.join() {
            Ok(0) => {}
            Ok(n) => warn!("{} digester(s) panicked", n),
            Err(_) => warn!("digester watcher panicked"),
        }
        if walk_handle.join().is_err() {
            return Err(WalkError::Panicked);
        }
        walk_result_rx.recv().unwrap_or(Err(WalkError::Panicked))
    }
}

/// Writer-side settings for [`index_root`].
#[derive(Default)]
pub struct RootRunOpts<'a> {
    pub strict: bool,
    pub drain: DrainParams<'a>,
}

/// Index one root: run the pipeline, drain entries into the store on the calling thread, then
/// check the walk's terminal error.
pub fn index_root(
    conn: &mut Connection,
    root: &Path,
    opts: &PipelineOpts,
    run: &RootRunOpts<'_>,
) -> Result<RootStats, IndexError> {
    if let Err(e) = std::fs::metadata(root) {
        return Err(IndexError::Walk {
            root: root.to_path_buf(),
            source: WalkError::Root(e),
        });
    }
    let root = root.to_path_buf();
    info!(
        "Indexing {} ({} digesters, bucket '{}')",
        root.display(),
        opts.tuning.num_threads,
        opts.bucket
    );

    let mut handles = run_pipeline(&root, opts);
    let mut writer = IndexWriter::new(conn, run.strict);
    let end = drain_entries(&mut writer, &handles.entry_rx, &run.drain);
    if !matches!(end, DrainEnd::Closed) {
        handles.cancel.cancel();
    }
    let written = writer.stats();
    let walk_result = handles.shutdown();

    match end {
        DrainEnd::Failed(err) => return Err(err),
        DrainEnd::Interrupted => return Err(IndexError::Interrupted { root }),
        DrainEnd::Closed => {}
    }
    let walked = walk_result.map_err(|source| IndexError::Walk {
        root: root.clone(),
        source,
    })?;

    let stats = RootStats {
        root,
        walked,
        stored: written.stored,
        digest_errors: written.digest_errors,
        persist_errors: written.persist_errors,
    };
    info!(
        "{}: {} stored, {} unreadable, {} not persisted",
        stats.root.display(),
        stats.stored,
        stats.digest_errors,
        stats.persist_errors
    );
    Ok(stats)
}
