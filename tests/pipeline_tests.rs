//! End-to-end runs: walk, digest and write into a store on disk.

use crossbeam_channel::bounded;
use dedup::engine::db_ops::{
    DrainEnd, DrainParams, IndexWriter, drain_entries, migrate_up, open_store_in_memory,
};
use dedup::engine::tools::path_to_db_string;
use dedup::error::WalkError;
use dedup::pipeline::{
    PathFilter, PipelineOpts, PipelineTuning, cancel_pair, run_pipeline, spawn_digest_workers,
};
use dedup::{IndexError, IndexOpts, index_roots};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

fn opts(db: &Path) -> IndexOpts {
    IndexOpts {
        db_path: db.to_path_buf(),
        ..Default::default()
    }
}

fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn row_count(db: &Path) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
        .unwrap()
}

fn stored_paths(db: &Path) -> Vec<String> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn.prepare("SELECT path FROM entries ORDER BY path").unwrap();
    stmt.query_map([], |r| r.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<String>>>()
        .unwrap()
}

/// Make `path` unreadable. Returns false when the process can still open it (e.g. root).
#[cfg(unix)]
fn make_unreadable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    fs::File::open(path).is_err()
}

#[test]
fn test_duplicate_contents_share_a_hash() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(
        root.path(),
        &[("a.txt", "hello"), ("b.txt", "hello"), ("sub/c.txt", "world")],
    );

    let mut o = opts(&db);
    o.bucket = "run1".to_string();
    let stats = index_roots(&[root.path()], &o).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].walked, 3);
    assert_eq!(stats[0].stored, 3);
    assert_eq!(stats[0].digest_errors, 0);
    assert_eq!(row_count(&db), 3);

    let conn = Connection::open(&db).unwrap();
    let mut stmt = conn
        .prepare("SELECT hash, COUNT(*) FROM entries GROUP BY hash HAVING COUNT(*) > 1")
        .unwrap();
    let groups: Vec<(String, i64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].1, 2);

    let hash_of = |name: &str| -> String {
        conn.query_row("SELECT hash FROM entries WHERE name = ?1", [name], |r| {
            r.get(0)
        })
        .unwrap()
    };
    assert_eq!(hash_of("a.txt"), groups[0].0);
    assert_eq!(hash_of("b.txt"), groups[0].0);
    assert_ne!(hash_of("c.txt"), groups[0].0);

    let (dir, bucket): (String, String) = conn
        .query_row(
            "SELECT dir, bucket FROM entries WHERE name = 'c.txt'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(dir, path_to_db_string(&root.path().join("sub")));
    assert_eq!(bucket, "run1");
}

#[test]
fn test_reindex_is_idempotent() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(root.path(), &[("a", "hello"), ("b", "hello"), ("c", "world")]);

    index_roots(&[root.path()], &opts(&db)).unwrap();
    index_roots(&[root.path()], &opts(&db)).unwrap();
    assert_eq!(row_count(&db), 3);
}

#[test]
fn test_reject_pattern_skips_tmp_files() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(
        root.path(),
        &[("keep.txt", "1"), ("drop.tmp", "2"), ("nested/also.tmp", "3")],
    );

    let mut o = opts(&db);
    o.reject = vec![r"\.tmp$".to_string()];
    let stats = index_roots(&[root.path()], &o).unwrap();
    assert_eq!(stats[0].walked, 1);

    let paths = stored_paths(&db);
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("keep.txt"));
}

#[test]
fn test_accept_pattern_selects_any_match() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(
        root.path(),
        &[("a.jpg", "1"), ("b.png", "2"), ("c.gif", "3")],
    );

    let mut o = opts(&db);
    o.accept = vec![r"\.jpg$".to_string(), r"\.png$".to_string()];
    index_roots(&[root.path()], &o).unwrap();
    assert_eq!(row_count(&db), 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(
        root.path(),
        &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d"), ("5", "e")],
    );
    if !make_unreadable(&root.path().join("3")) {
        eprintln!("skipping: permissions are not enforced for this user");
        return;
    }

    let stats = index_roots(&[root.path()], &opts(&db)).unwrap();
    assert_eq!(stats[0].walked, 5);
    assert_eq!(stats[0].stored, 4);
    assert_eq!(stats[0].digest_errors, 1);
    assert_eq!(row_count(&db), 4);
}

#[cfg(unix)]
#[test]
fn test_strict_mode_fails_on_unreadable_file() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(root.path(), &[("1", "a"), ("2", "b")]);
    if !make_unreadable(&root.path().join("2")) {
        eprintln!("skipping: permissions are not enforced for this user");
        return;
    }

    let mut o = opts(&db);
    o.strict = true;
    let err = index_roots(&[root.path()], &o).unwrap_err();
    assert!(matches!(err, IndexError::Digest(_)));
}

/// Paths that exist plus one that vanished between walk and digest.
fn paths_with_one_missing(dir: &Path) -> Vec<PathBuf> {
    write_files(dir, &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);
    let mut paths: Vec<PathBuf> = ["1", "2", "3", "4"].iter().map(|n| dir.join(n)).collect();
    paths.insert(2, dir.join("vanished"));
    paths
}

#[test]
fn test_vanished_file_counts_as_digest_error() {
    let root = TempDir::new().unwrap();
    let paths = paths_with_one_missing(root.path());
    let mut conn = open_store_in_memory().unwrap();
    migrate_up(&mut conn).unwrap();

    let (_cancel, token) = cancel_pair();
    let (path_tx, path_rx) = bounded(paths.len());
    for p in paths {
        path_tx.send(p).unwrap();
    }
    drop(path_tx);
    let (entry_tx, entry_rx) = bounded(2);
    let workers = spawn_digest_workers("b", path_rx, &entry_tx, &token, 3);
    drop(entry_tx);

    let mut writer = IndexWriter::new(&mut conn, false);
    let end = drain_entries(&mut writer, &entry_rx, &DrainParams::default());
    assert!(matches!(end, DrainEnd::Closed));
    let stats = writer.stats();
    assert_eq!(stats.received, 5);
    assert_eq!(stats.stored, 4);
    assert_eq!(stats.digest_errors, 1);
    for w in workers {
        w.join().unwrap();
    }

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 4);
}

#[test]
fn test_strict_mode_fails_on_vanished_file() {
    let root = TempDir::new().unwrap();
    let paths = paths_with_one_missing(root.path());
    let mut conn = open_store_in_memory().unwrap();
    migrate_up(&mut conn).unwrap();

    let (mut cancel, token) = cancel_pair();
    let (path_tx, path_rx) = bounded(paths.len());
    for p in paths {
        path_tx.send(p).unwrap();
    }
    drop(path_tx);
    let (entry_tx, entry_rx) = bounded(1);
    let workers = spawn_digest_workers("b", path_rx, &entry_tx, &token, 2);
    drop(entry_tx);

    let mut writer = IndexWriter::new(&mut conn, true);
    let end = drain_entries(&mut writer, &entry_rx, &DrainParams::default());
    assert!(matches!(end, DrainEnd::Failed(IndexError::Digest(_))));
    assert!(writer.stats().stored < 5);

    cancel.cancel();
    drop(entry_rx);
    for w in workers {
        w.join().unwrap();
    }
}

#[test]
fn test_changed_content_leaves_stale_row() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(root.path(), &[("a", "hello")]);
    index_roots(&[root.path()], &opts(&db)).unwrap();

    write_files(root.path(), &[("a", "world")]);
    index_roots(&[root.path()], &opts(&db)).unwrap();

    let conn = Connection::open(&db).unwrap();
    let mut stmt = conn
        .prepare("SELECT hash FROM entries WHERE name = 'a' ORDER BY hash")
        .unwrap();
    let hashes: Vec<String> = stmt
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(hashes.len(), 2);
    assert_ne!(hashes[0], hashes[1]);
}

#[test]
fn test_parallelism_does_not_lose_entries() {
    let root = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..60)
        .map(|i| (format!("d{}/f{}", i % 5, i), format!("content {i}")))
        .collect();
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    write_files(root.path(), &refs);

    for (parallelism, cap) in [(1, 16), (4, 16), (16, 16), (4, 0)] {
        let store = TempDir::new().unwrap();
        let db = store.path().join("dedup.db");
        let mut o = opts(&db);
        o.parallelism = parallelism;
        o.channel_cap = cap;
        let stats = index_roots(&[root.path()], &o).unwrap();
        assert_eq!(stats[0].stored, 60, "parallelism {parallelism}");
        assert_eq!(row_count(&db), 60, "parallelism {parallelism}");
    }
}

#[test]
fn test_cancel_stops_pipeline_promptly() {
    let root = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..200).map(|i| (format!("f{i}"), format!("{i}"))).collect();
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    write_files(root.path(), &refs);

    let popts = PipelineOpts {
        bucket: "b".to_string(),
        filter: PathFilter::default(),
        skip: Vec::new(),
        tuning: PipelineTuning {
            num_threads: 2,
            channel_cap: 1,
        },
    };
    let mut handles = run_pipeline(root.path(), &popts);
    for _ in 0..3 {
        assert!(handles.entry_rx.recv().unwrap().is_ok());
    }
    handles.cancel.cancel();
    let result = handles.shutdown();
    assert!(matches!(result, Err(WalkError::Cancelled)));
}

#[test]
fn test_interrupt_flag_ends_run_as_interrupted() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(root.path(), &[("a", "1"), ("b", "2")]);

    let mut o = opts(&db);
    o.interrupt = Some(Arc::new(AtomicBool::new(true)));
    let err = index_roots(&[root.path()], &o).unwrap_err();
    assert!(matches!(err, IndexError::Interrupted { .. }));
}

#[test]
fn test_missing_root_stops_later_roots() {
    let first = TempDir::new().unwrap();
    let last = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(first.path(), &[("a", "first")]);
    write_files(last.path(), &[("z", "last")]);
    let missing = first.path().join("does-not-exist");

    let roots: Vec<PathBuf> = vec![first.path().into(), missing, last.path().into()];
    let err = index_roots(&roots, &opts(&db)).unwrap_err();
    assert!(matches!(
        err,
        IndexError::Walk {
            source: WalkError::Root(_),
            ..
        }
    ));

    let paths = stored_paths(&db);
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("a"));
}

#[test]
fn test_store_inside_root_is_not_indexed() {
    let root = TempDir::new().unwrap();
    let db = root.path().join("dedup.db");
    write_files(root.path(), &[("a", "1"), ("b", "2")]);

    index_roots(&[root.path()], &opts(&db)).unwrap();
    index_roots(&[root.path()], &opts(&db)).unwrap();
    let paths = stored_paths(&db);
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| !p.contains("dedup.db")));
}

#[test]
fn test_empty_root_stores_nothing() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");

    let stats = index_roots(&[root.path()], &opts(&db)).unwrap();
    assert_eq!(stats[0].walked, 0);
    assert_eq!(row_count(&db), 0);
}

#[test]
fn test_no_roots_is_config_error() {
    let store = TempDir::new().unwrap();
    let roots: Vec<PathBuf> = Vec::new();
    let err = index_roots(&roots, &opts(&store.path().join("x.db"))).unwrap_err();
    assert!(matches!(err, IndexError::NoRoots));
}

#[test]
fn test_bad_pattern_does_not_create_store() {
    let root = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");

    let mut o = opts(&db);
    o.accept = vec!["(".to_string()];
    let err = index_roots(&[root.path()], &o).unwrap_err();
    assert!(err.is_config());
    assert!(!db.exists());
}

#[test]
fn test_migrate_down_resets_store() {
    let root = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let db = store.path().join("dedup.db");
    write_files(root.path(), &[("a", "1"), ("b", "2")]);
    write_files(other.path(), &[("c", "3")]);

    index_roots(&[root.path()], &opts(&db)).unwrap();
    let mut o = opts(&db);
    o.migrate = Some(dedup::MigrateDirection::Down);
    index_roots(&[other.path()], &o).unwrap();
    assert_eq!(row_count(&db), 1);
}
