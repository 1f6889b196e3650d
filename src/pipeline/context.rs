//! Pipeline channels and tuning for one root.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;

use crate::Digested;
use crate::utils::fd_limit::effective_parallelism;

use super::filter::PathFilter;
use super::walk::WalkResult;

/// Resolved worker count and channel capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_threads: usize,
    /// Capacity for path and entry channels (0 = rendezvous).
    pub channel_cap: usize,
}

impl PipelineTuning {
    /// `parallelism == 0` means one digester per available thread; always at least one.
    pub fn resolve(parallelism: usize, channel_cap: usize) -> Self {
        Self {
            num_threads: effective_parallelism(parallelism),
            channel_cap,
        }
    }
}

/// Everything a root run needs that does not change between roots.
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    pub bucket: String,
    pub filter: PathFilter,
    /// Files never offered to the filter (the store and its side files).
    pub skip: Vec<PathBuf>,
    pub tuning: PipelineTuning,
}

/// Channels for one root. Walk thread gets path_tx and walk_result_tx; digesters get path_rx and
/// entry_tx; the writer gets entry_rx. Never reused across roots.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub entry_tx: Sender<Digested>,
    pub entry_rx: Receiver<Digested>,
    pub walk_result_tx: Sender<WalkResult>,
    pub walk_result_rx: Receiver<WalkResult>,
}

pub fn create_pipeline_channels(channel_cap: usize) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(channel_cap);
    let (entry_tx, entry_rx) = bounded::<Digested>(channel_cap);
    let (walk_result_tx, walk_result_rx) = bounded::<WalkResult>(1);
    PipelineChannels {
        path_tx,
        path_rx,
        entry_tx,
        entry_rx,
        walk_result_tx,
        walk_result_rx,
    }
}
