use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hydra_apps::dedup::{DedupSerializer, DedupWorker};
use hydra_apps::db::open_indexer_db;
use hydra_apps::indexer::{IndexSerializer, IndexWorker};
use hydra_engine::config::EngineConfig;
use hydra_engine::{run_engine, FsWalker};

fn fast_config(workers: usize) -> EngineConfig {
    EngineConfig {
        workers,
        queue_capacity: 64,
        commit_interval: Duration::from_millis(20),
        status_interval: Duration::from_millis(5),
    }
}

/// §8 scenario 1: two identical files plus one empty file, N=2 workers.
#[tokio::test]
async fn indexer_end_to_end_over_a_small_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    std::fs::create_dir(dir.path().join("c")).unwrap();
    std::fs::write(dir.path().join("c").join("empty"), b"").unwrap();

    let db_path = dir.path().join("files_test.db");
    let conn = open_indexer_db(&db_path).unwrap();

    let outcome = run_engine(
        fast_config(2),
        FsWalker::new(dir.path()),
        Arc::new(IndexWorker),
        IndexSerializer::new(conn),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(outcome.counters.indexed, 2);
    assert_eq!(outcome.counters.skipped, 1);
    assert_eq!(outcome.counters.logged, 2);

    let count: i64 = rusqlite::Connection::open(&db_path)
        .unwrap()
        .query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let hashes: Vec<String> = {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let mut stmt = conn.prepare("SELECT hash FROM files ORDER BY path").unwrap();
        stmt.query_map([], |r| r.get(0)).unwrap().collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(hashes.len(), 2);
    assert_eq!(hashes[0], hashes[1]);
    assert_eq!(hashes[0].len(), 128);
}

/// §8 scenario 2: three identical files following the `_N` naming convention.
#[tokio::test]
async fn dedup_flags_suffixed_copies_without_warnings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("x.jpg"), b"same bytes").unwrap();
    std::fs::write(dir.path().join("x_1.jpg"), b"same bytes").unwrap();
    std::fs::write(dir.path().join("x_2.jpg"), b"same bytes").unwrap();

    let outcome = run_engine(
        fast_config(2),
        FsWalker::new(dir.path()),
        Arc::new(DedupWorker),
        DedupSerializer::new(false),
        |_| {},
    )
    .await
    .unwrap();

    let mut duplicates: Vec<PathBuf> = outcome.main_data;
    duplicates.sort();
    assert_eq!(
        duplicates,
        vec![dir.path().join("x_1.jpg"), dir.path().join("x_2.jpg")]
    );
}

/// §8 scenario 3: two identical files with no suffix convention — a warning
/// must fire so batch mode refuses to delete.
#[tokio::test]
async fn dedup_warns_when_no_suffix_convention_is_present() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.bin"), b"same bytes").unwrap();
    std::fs::write(dir.path().join("b.bin"), b"same bytes").unwrap();

    let outcome = run_engine(
        fast_config(2),
        FsWalker::new(dir.path()),
        Arc::new(DedupWorker),
        DedupSerializer::new(false),
        |_| {},
    )
    .await
    .unwrap();

    let duplicates: std::collections::HashSet<PathBuf> = outcome.main_data.into_iter().collect();
    assert_eq!(duplicates, std::collections::HashSet::from([dir.path().join("b.bin")]));
    assert_eq!(hydra_apps::dedup::count_warnings(&duplicates), 1);
}
