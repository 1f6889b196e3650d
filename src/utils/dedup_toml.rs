//! Load `.dedup.toml` (CLI only). Lib callers pass [`IndexOpts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::IndexOpts;
use crate::utils::logger::{LogFormat, LogLevel, LogSettings, LogStream};

#[derive(Debug, Default, Deserialize)]
pub struct DedupToml {
    #[serde(default)]
    index: IndexSection,
    #[serde(default)]
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
struct IndexSection {
    database: Option<String>,
    bucket: Option<String>,
    parallelism: Option<usize>,
    accept: Option<Vec<String>>,
    reject: Option<Vec<String>>,
    strict: Option<bool>,
    channel_cap: Option<usize>,
    progress: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LogSection {
    level: Option<LogLevel>,
    stream: Option<LogStream>,
    format: Option<LogFormat>,
}

/// Load the config file at `path`. Returns None if missing or unreadable; parse errors are
/// reported on stderr since the logger is configured from this file.
pub(crate) fn load_dedup_toml(path: &Path) -> Option<DedupToml> {
    let s = std::fs::read_to_string(path).ok()?;
    toml::from_str(&s)
        .map_err(|e| eprintln!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite target field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $target:expr, $section_field:ident => $target_field:ident) => {
        if let Some(v) = $section.$section_field.clone() {
            $target.$target_field = v;
        }
    };
}

/// Apply the `[index]` section to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &DedupToml, opts: &mut IndexOpts) {
    let idx = &file.index;
    if let Some(ref p) = idx.database {
        opts.db_path = PathBuf::from(p);
    }
    apply_file_opt!(idx, opts, bucket => bucket);
    apply_file_opt!(idx, opts, parallelism => parallelism);
    apply_file_opt!(idx, opts, accept => accept);
    apply_file_opt!(idx, opts, reject => reject);
    apply_file_opt!(idx, opts, strict => strict);
    apply_file_opt!(idx, opts, channel_cap => channel_cap);
    apply_file_opt!(idx, opts, progress => progress);
}

/// Apply the `[log]` section to settings.
pub(crate) fn apply_file_to_log(file: &DedupToml, settings: &mut LogSettings) {
    let log = &file.log;
    apply_file_opt!(log, settings, level => level);
    apply_file_opt!(log, settings, stream => stream);
    apply_file_opt!(log, settings, format => format);
}

/// Store path from the file, if any (the query command only needs this).
pub(crate) fn file_database(file: &DedupToml) -> Option<PathBuf> {
    file.index.database.as_ref().map(PathBuf::from)
}
