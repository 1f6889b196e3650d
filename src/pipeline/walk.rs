//! Walk loop: consumes a directory iterator, filters regular files and hands admitted paths to
//! the digesters. The terminal result goes out on its own single-slot channel.

use crossbeam_channel::Sender;
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::engine::tools::path_to_db_string;
use crate::error::WalkError;

use super::cancel::{CancelToken, Handoff, send_or_cancel};
use super::filter::PathFilter;

/// One result from a directory walk.
pub enum WalkOutcome {
    /// A regular file.
    File(PathBuf),
    /// Directory, symlink, device, socket...: never a candidate.
    Other(PathBuf),
    Err(WalkError),
}

/// Paths sent on success; the first enumeration error or cancellation otherwise.
pub type WalkResult = Result<usize, WalkError>;

/// Convert a walkdir result into [`WalkOutcome`]. Links are not followed, so a symlink reports
/// its own file type and is never a regular file.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_file() => WalkOutcome::File(entry.into_path()),
        Ok(entry) => WalkOutcome::Other(entry.into_path()),
        Err(err) => WalkOutcome::Err(WalkError::Io(err)),
    }
}

/// What the walk thread needs besides its channels.
pub struct WalkContext {
    pub root: PathBuf,
    pub filter: PathFilter,
    /// Canonical paths never offered to the filter (the store and its side files).
    pub skip: Vec<PathBuf>,
    pub cancel: CancelToken,
}

pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    result_tx: Sender<WalkResult>,
    ctx: WalkContext,
) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("walk: starting directory tree visit of {}", ctx.root.display());
        let iter = WalkDir::new(&ctx.root)
            .follow_links(false)
            .into_iter()
            .map(to_outcome_walkdir);
        let result = run_walk_loop(path_tx, &ctx, iter);
        match &result {
            Ok(count) => debug!("walk: {} done, {} paths sent", ctx.root.display(), count),
            Err(err) => error!("walk: {} aborted: {}", ctx.root.display(), err),
        }
        // Single-slot channel and a single send: never blocks.
        let _ = result_tx.send(result);
    })
}

/// True when `path`, as walked, is one of the canonical `skip` paths. Only paths whose file name
/// matches a skip entry have their parent resolved.
fn is_skipped(path: &Path, skip: &[PathBuf]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if !skip.iter().any(|s| s.file_name() == Some(name)) {
        return false;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent
        .canonicalize()
        .is_ok_and(|parent| skip.contains(&parent.join(name)))
}

/// Run the walk loop over `iter`: skip non-files and store files, apply the filter, and send
/// admitted paths. The first error ends the walk. `path_tx` is dropped on return, which closes
/// the path channel exactly once whatever the outcome.
pub fn run_walk_loop<I>(path_tx: Sender<PathBuf>, ctx: &WalkContext, iter: I) -> WalkResult
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        let path = match outcome {
            WalkOutcome::File(path) => path,
            WalkOutcome::Other(path) => {
                debug!("{} is not a regular file", path.display());
                continue;
            }
            WalkOutcome::Err(err) => return Err(err),
        };
        if is_skipped(&path, &ctx.skip) {
            debug!("{} skipped: store file", path.display());
            continue;
        }
        let path_str = path_to_db_string(&path);
        if !ctx.filter.admits(&path_str) {
            continue;
        }
        match send_or_cancel(&path_tx, path, &ctx.cancel) {
            Handoff::Delivered => count += 1,
            Handoff::Cancelled | Handoff::Disconnected => {
                warn!("filesystem visit cancelled at {}", path_str);
                return Err(WalkError::Cancelled);
            }
        }
    }
    Ok(count)
}
