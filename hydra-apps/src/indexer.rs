use std::path::PathBuf;

use hydra_core::exif::ExifFields;
use hydra_core::hash::hash_file;
use hydra_engine::capability::{Serializer, WorkerApp};
use hydra_engine::error::WorkError;
use rusqlite::Connection;

/// One staged row for the indexer's `files` table (§3, §6).
#[derive(Debug, Clone)]
pub struct IndexedRow {
    pub hash: String,
    pub size: u64,
    pub date: String,
    pub exif: ExifFields,
}

/// `work` hook: stats the path, hashes it, and extracts EXIF.
pub struct IndexWorker;

impl WorkerApp for IndexWorker {
    type Item = PathBuf;
    type Result = IndexedRow;

    async fn work(&self, _worker_index: usize, item: &PathBuf) -> Result<Option<IndexedRow>, WorkError> {
        let metadata = std::fs::metadata(item).map_err(classify_io_error)?;
        if !metadata.is_file() {
            return Err(WorkError::NotRegular(item.display().to_string()));
        }
        if metadata.len() == 0 {
            return Err(WorkError::Empty(item.display().to_string()));
        }

        let item = item.clone();
        let row = tokio::task::spawn_blocking(move || -> Result<IndexedRow, WorkError> {
            let hash = hash_file(&item).map_err(classify_io_error)?;
            let exif = hydra_core::exif::extract(&item).map_err(classify_io_error)?;
            Ok(IndexedRow { hash, size: metadata.len(), date: ctime_string(&metadata), exif })
        })
        .await
        .map_err(|e| WorkError::Other(e.to_string()))??;

        Ok(Some(row))
    }
}

fn classify_io_error(err: std::io::Error) -> WorkError {
    match err.kind() {
        std::io::ErrorKind::NotFound => WorkError::NotFound(err.to_string()),
        std::io::ErrorKind::PermissionDenied => WorkError::PermissionDenied(err.to_string()),
        _ => WorkError::Io(err),
    }
}

#[cfg(unix)]
fn ctime_string(metadata: &std::fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.ctime().to_string()
}

#[cfg(not(unix))]
fn ctime_string(metadata: &std::fs::Metadata) -> String {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

/// Librarian-side serializer: stages rows in memory, flushes them to SQLite
/// inside one transaction per commit (§4.8).
pub struct IndexSerializer {
    conn: Connection,
    staged: Vec<(PathBuf, IndexedRow)>,
}

impl IndexSerializer {
    pub fn new(conn: Connection) -> Self {
        Self { conn, staged: Vec::new() }
    }
}

impl Serializer for IndexSerializer {
    type Item = PathBuf;
    type Result = IndexedRow;
    type MainPayload = ();

    async fn insert(&mut self, path: PathBuf, result: IndexedRow) {
        self.staged.push((path, result));
    }

    async fn commit(&mut self, _final_flush: bool) {
        if self.staged.is_empty() {
            return;
        }

        let tx = match self.conn.transaction() {
            Ok(tx) => tx,
            Err(err) => {
                tracing::error!(error = %err, "failed to open indexer commit transaction");
                return;
            }
        };

        for (path, row) in self.staged.drain(..) {
            let result = tx.execute(
                "INSERT INTO files (path, hash, size, date, camera, lens, exp_time, exp_fnum, exp_iso, focal_length, flash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    path.to_string_lossy(),
                    row.hash,
                    row.size,
                    row.date,
                    row.exif.camera,
                    row.exif.lens,
                    row.exif.exp_time,
                    row.exif.exp_fnum,
                    row.exif.exp_iso,
                    row.exif.focal_length,
                    row.exif.flash,
                ],
            );
            if let Err(err) = result {
                tracing::error!(path = %path.display(), error = %err, "failed to insert indexed row");
            }
        }

        if let Err(err) = tx.commit() {
            tracing::error!(error = %err, "failed to commit indexer transaction");
        } else {
            tracing::debug!("indexer commit flushed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_indexer_db;

    #[tokio::test]
    async fn work_hashes_and_sizes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello").unwrap();

        let worker = IndexWorker;
        let row = worker.work(0, &path).await.unwrap().unwrap();
        assert_eq!(row.size, 5);
        assert_eq!(row.hash.len(), 128);
    }

    #[tokio::test]
    async fn work_rejects_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        let worker = IndexWorker;
        let err = worker.work(0, &path).await.unwrap_err();
        assert!(matches!(err, WorkError::Empty(_)));
    }

    #[tokio::test]
    async fn commit_flushes_staged_rows_into_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("files_20240101_0000.db");
        let conn = open_indexer_db(&db_path).unwrap();
        let mut serializer = IndexSerializer::new(conn);

        serializer
            .insert(
                PathBuf::from("a.txt"),
                IndexedRow {
                    hash: "h".repeat(128),
                    size: 5,
                    date: "1700000000".to_string(),
                    exif: ExifFields::default(),
                },
            )
            .await;
        serializer.commit(false).await;

        let count: i64 =
            serializer.conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }
}
