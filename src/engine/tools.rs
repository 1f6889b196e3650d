//! Path utilities

use std::path::{Path, PathBuf};

/// String identity of a path as stored in the index. Separators are normalized to `/` on
/// Windows; elsewhere the path is kept as-is (lossy for non-UTF-8 names).
pub fn path_to_db_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Split a stored path into `(dir, name)` columns. Either may be empty.
pub fn split_dir_name(path: &Path) -> (String, String) {
    let dir = path
        .parent()
        .map(path_to_db_string)
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}

/// The store file and its SQLite side files (`-wal`, `-shm`, `-journal`), canonicalized through
/// the parent directory. The walker resolves a candidate's parent the same way before comparing.
/// Empty when the parent cannot be resolved.
pub fn store_files(db_path: &Path) -> Vec<PathBuf> {
    let Some(name) = db_path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let parent = match db_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Ok(parent) = parent.canonicalize() else {
        return Vec::new();
    };
    ["", "-wal", "-shm", "-journal"]
        .iter()
        .map(|suffix| parent.join(format!("{name}{suffix}")))
        .collect()
}
