//! Progress counter for index runs.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Counter with no total (shows stored entries and rate).
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Force a refresh so the counter shows "0 files" immediately.
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Advance the bar by `n`. Skips the update if the lock is contended.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update(n);
    }
}

/// Callback for [`DrainParams::on_stored`](crate::engine::db_ops::DrainParams).
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<Box<dyn Fn(usize) + Send>> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as Box<dyn Fn(usize) + Send>
    })
}

/// Counter for `--progress`, refreshed once so it appears before the first entry.
pub fn setup_progress(enabled: bool) -> Option<ProgressBar> {
    enabled.then(|| {
        let bar = create_counter("Indexing");
        refresh_bar(&bar);
        bar
    })
}

/// Final refresh and newline so log lines don't overwrite the counter.
pub fn finish_progress(bar: &Option<ProgressBar>) {
    if let Some(bar) = bar {
        refresh_bar(bar);
        eprintln!();
    }
}
