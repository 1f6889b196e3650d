//! Relative roots: paths are stored exactly as walked from the working directory.
//! Kept in its own test binary because it changes the process working directory.

use dedup::{IndexOpts, index_roots};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn stored(db: &Path) -> Vec<(String, String)> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT path, dir FROM entries ORDER BY path")
        .unwrap();
    stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap()
}

#[test]
fn test_relative_root_stores_paths_as_walked() {
    let cwd = TempDir::new().unwrap();
    fs::create_dir(cwd.path().join("photos")).unwrap();
    fs::write(cwd.path().join("photos/a.txt"), "a").unwrap();
    fs::write(cwd.path().join("photos/b.log"), "b").unwrap();
    std::env::set_current_dir(cwd.path()).unwrap();

    // The filter sees the relative path, so an anchored pattern matches.
    let opts = IndexOpts {
        db_path: PathBuf::from("index.db"),
        accept: vec![r"^photos/.*\.txt$".to_string()],
        ..Default::default()
    };
    let stats = index_roots(&["photos"], &opts).unwrap();
    assert_eq!(stats[0].root, PathBuf::from("photos"));
    assert_eq!(stats[0].stored, 1);
    assert_eq!(
        stored(Path::new("index.db")),
        vec![("photos/a.txt".to_string(), "photos".to_string())]
    );

    // A relative store inside the relative root is still recognized and skipped.
    let opts = IndexOpts {
        db_path: PathBuf::from("photos/inside.db"),
        ..Default::default()
    };
    index_roots(&["photos"], &opts).unwrap();
    index_roots(&["photos"], &opts).unwrap();
    let paths: Vec<String> = stored(Path::new("photos/inside.db"))
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(paths, vec!["photos/a.txt", "photos/b.log"]);
}
