use std::path::Path;

use rusqlite::{backup, Connection};

/// Schema for the indexer's output database (§6).
pub const CREATE_FILES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL,
    hash TEXT NOT NULL,
    size INTEGER NOT NULL,
    date TEXT NOT NULL,
    camera TEXT,
    lens TEXT,
    exp_time TEXT,
    exp_fnum TEXT,
    exp_iso TEXT,
    focal_length TEXT,
    flash TEXT
)";

/// Opens (creating if absent) the indexer's timestamped SQLite file and
/// ensures the `files` table exists.
pub fn open_indexer_db(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute(CREATE_FILES_TABLE, [])?;
    Ok(conn)
}

/// Copies `src` into a fresh in-memory connection via SQLite's backup API —
/// the per-worker reference-DB snapshot used by the comparator and
/// synchronizer's `init` hook (§4.3, §5) to keep reference lookups off the
/// hot path and out of cross-task lock contention.
pub fn snapshot_to_memory(src: &Path) -> rusqlite::Result<Connection> {
    let source = Connection::open(src)?;
    let mut dest = Connection::open_in_memory()?;
    {
        let backup = backup::Backup::new(&source, &mut dest)?;
        backup.run_to_completion(5, std::time::Duration::from_millis(0), None)?;
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_indexer_db_creates_files_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files_20240101_0000.db");
        let conn = open_indexer_db(&path).unwrap();
        conn.execute(
            "INSERT INTO files (path, hash, size, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params!["a.txt", "deadbeef", 5, "1700000000"],
        )
        .unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn snapshot_to_memory_round_trips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.db");
        let conn = open_indexer_db(&path).unwrap();
        conn.execute(
            "INSERT INTO files (path, hash, size, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params!["projA/2020/pic.jpg", "H", 123, "1700000000"],
        )
        .unwrap();
        drop(conn);

        let snapshot = snapshot_to_memory(&path).unwrap();
        let hash: String = snapshot
            .query_row("SELECT hash FROM files WHERE path = ?1", ["projA/2020/pic.jpg"], |r| r.get(0))
            .unwrap();
        assert_eq!(hash, "H");
    }
}
