//! Pipeline components: cancellation, filter, walk, digesters, orchestration.

pub mod cancel;
pub mod context;
pub mod digest;
pub mod filter;
pub mod orchestrator;
pub mod walk;

pub use cancel::{CancelHandle, CancelToken, Handoff, cancel_pair, send_or_cancel};
pub use context::{PipelineChannels, PipelineOpts, PipelineTuning, create_pipeline_channels};
pub use digest::{digest_path, spawn_digest_workers};
pub use filter::PathFilter;
pub use orchestrator::{PipelineHandles, RootRunOpts, index_root, run_pipeline};
pub use walk::{WalkContext, WalkOutcome, WalkResult, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
