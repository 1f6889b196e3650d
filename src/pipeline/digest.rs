//! Digester pool: workers share the path channel and emit one [`Digested`] per path.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::hashing::hash_file;
use crate::engine::tools::path_to_db_string;
use crate::error::DigestError;
use crate::{Digested, Entry};

use super::cancel::{CancelToken, Handoff, send_or_cancel};

/// Digest one path into an entry labelled with `bucket`.
pub fn digest_path(path: &Path, bucket: &str) -> Digested {
    let path_str = path_to_db_string(path);
    match hash_file(path) {
        Ok((hash, size)) => Ok(Entry {
            path: path_str,
            hash,
            bucket: bucket.to_string(),
            size,
        }),
        Err(source) => Err(DigestError {
            path: path_str,
            source,
        }),
    }
}

/// Single digester: read paths until the channel closes, emit each result. Exits early, without
/// draining the rest of the paths, when cancellation is observed while emitting.
fn digest_worker_loop(
    id: usize,
    bucket: String,
    path_rx: Receiver<PathBuf>,
    entry_tx: Sender<Digested>,
    cancel: CancelToken,
) {
    debug!("digester {}: started", id);
    while let Ok(path) = path_rx.recv() {
        let digested = digest_path(&path, &bucket);
        if let Err(ref err) = digested {
            debug!("digester {}: {}", id, err);
        }
        match send_or_cancel(&entry_tx, digested, &cancel) {
            Handoff::Delivered => {}
            Handoff::Cancelled | Handoff::Disconnected => {
                debug!("digester {}: cancelled, dropping {}", id, path.display());
                return;
            }
        }
    }
    debug!("digester {}: done", id);
}

/// Spawn `num_threads` digesters on the shared path channel. Each holds its own clone of
/// `entry_tx`; the caller must drop its sender after this so the entry channel closes when the
/// last digester exits.
pub fn spawn_digest_workers(
    bucket: &str,
    path_rx: Receiver<PathBuf>,
    entry_tx: &Sender<Digested>,
    cancel: &CancelToken,
    num_threads: usize,
) -> Vec<JoinHandle<()>> {
    debug!("starting {} file digesters", num_threads);
    (0..num_threads)
        .map(|id| {
            let bucket = bucket.to_string();
            let path_rx = path_rx.clone();
            let entry_tx = entry_tx.clone();
            let cancel = cancel.clone();
            thread::spawn(move || digest_worker_loop(id, bucket, path_rx, entry_tx, cancel))
        })
        .collect()
}
