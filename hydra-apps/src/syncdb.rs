use std::path::{Path, PathBuf};

use hydra_core::hash::hash_file;
use hydra_engine::capability::{Serializer, WorkerApp};
use hydra_engine::error::WorkError;
use rusqlite::Connection;
use tokio::sync::Mutex;

/// Outcome of looking a hashed input file up in the reference database
/// (§4.8). `NotFound` still reaches the librarian as a result record (not a
/// silent drop) so it's logged and counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Rebased(PathBuf),
    NotFound,
}

/// Strips `path`'s prefix up to and including the first component equal to
/// `anchor`, returning the remaining relative path. `None` if `anchor` never
/// occurs.
pub fn rebase_after_anchor(path: &Path, anchor: &str) -> Option<PathBuf> {
    let mut components = path.components();
    for component in components.by_ref() {
        if component.as_os_str() == anchor {
            let rest: PathBuf = components.as_path().to_path_buf();
            return Some(rest);
        }
    }
    None
}

/// `init`/`work` hook: snapshots the reference DB once per worker, then
/// looks up each input file by hash, disambiguating same-hash collisions by
/// basename match and verifying size equality before rebasing (§4.3, §4.8).
pub struct SyncWorker {
    reference_db: PathBuf,
    anchor: String,
    snapshot: Mutex<Option<Connection>>,
}

impl SyncWorker {
    pub fn new(reference_db: impl Into<PathBuf>, anchor: impl Into<String>) -> Self {
        Self { reference_db: reference_db.into(), anchor: anchor.into(), snapshot: Mutex::new(None) }
    }
}

impl WorkerApp for SyncWorker {
    type Item = PathBuf;
    type Result = SyncOutcome;

    async fn init(&self, _worker_index: usize) -> Result<(), WorkError> {
        let conn = crate::db::snapshot_to_memory(&self.reference_db)
            .map_err(|e| WorkError::Other(e.to_string()))?;
        *self.snapshot.lock().await = Some(conn);
        Ok(())
    }

    async fn work(&self, _worker_index: usize, item: &PathBuf) -> Result<Option<SyncOutcome>, WorkError> {
        let hash = {
            let item = item.clone();
            tokio::task::spawn_blocking(move || hash_file(&item))
                .await
                .map_err(|e| WorkError::Other(e.to_string()))?
                .map_err(WorkError::Io)?
        };

        let metadata = std::fs::metadata(item).map_err(WorkError::Io)?;
        let basename = item.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();

        let guard = self.snapshot.lock().await;
        let conn = guard.as_ref().ok_or_else(|| WorkError::Other("reference snapshot not initialized".into()))?;

        let mut stmt = conn
            .prepare("SELECT path, size FROM files WHERE hash = ?1")
            .map_err(|e| WorkError::Other(e.to_string()))?;
        let mut rows = stmt
            .query(rusqlite::params![hash])
            .map_err(|e| WorkError::Other(e.to_string()))?;

        let mut matched: Option<(String, i64)> = None;
        while let Some(row) = rows.next().map_err(|e| WorkError::Other(e.to_string()))? {
            let ref_path: String = row.get(0).map_err(|e| WorkError::Other(e.to_string()))?;
            let size: i64 = row.get(1).map_err(|e| WorkError::Other(e.to_string()))?;
            let ref_basename = Path::new(&ref_path).file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if ref_basename == basename {
                matched = Some((ref_path, size));
                break;
            }
        }

        let Some((ref_path, ref_size)) = matched else {
            return Ok(Some(SyncOutcome::NotFound));
        };

        if ref_size as u64 != metadata.len() {
            tracing::warn!(path = %item.display(), "hash match but size mismatch, dropping");
            return Ok(None);
        }

        match rebase_after_anchor(Path::new(&ref_path), &self.anchor) {
            Some(rebased) => Ok(Some(SyncOutcome::Rebased(rebased))),
            None => Ok(Some(SyncOutcome::NotFound)),
        }
    }
}

/// Librarian-side serializer: creates missing target directories and copies
/// matched files (unless `dry_run`), tallying `files_moved`/`files_skipped`
/// and logging the final count (§4.8).
pub struct SyncSerializer {
    destination_root: PathBuf,
    dry_run: bool,
    files_moved: u64,
    files_skipped: u64,
}

impl SyncSerializer {
    pub fn new(destination_root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self { destination_root: destination_root.into(), dry_run, files_moved: 0, files_skipped: 0 }
    }

    pub fn files_moved(&self) -> u64 {
        self.files_moved
    }

    pub fn files_skipped(&self) -> u64 {
        self.files_skipped
    }
}

impl Serializer for SyncSerializer {
    type Item = PathBuf;
    type Result = SyncOutcome;
    type MainPayload = ();

    async fn insert(&mut self, path: PathBuf, result: SyncOutcome) {
        let rebased = match result {
            SyncOutcome::Rebased(rebased) => rebased,
            SyncOutcome::NotFound => {
                tracing::warn!(path = %path.display(), "not found in reference database, skipping");
                self.files_skipped += 1;
                return;
            }
        };

        let destination = self.destination_root.join(&rebased);
        if self.dry_run {
            tracing::info!(from = %path.display(), to = %destination.display(), "dry run: would copy");
            self.files_moved += 1;
            return;
        }

        if let Some(parent) = destination.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                if err.kind() != std::io::ErrorKind::AlreadyExists {
                    tracing::error!(dir = %parent.display(), error = %err, "failed to create target directory");
                    self.files_skipped += 1;
                    return;
                }
            }
        }

        match std::fs::copy(&path, &destination) {
            Ok(_) => self.files_moved += 1,
            Err(err) => {
                tracing::error!(from = %path.display(), to = %destination.display(), error = %err, "failed to copy file");
                self.files_skipped += 1;
            }
        }
    }

    async fn commit(&mut self, final_flush: bool) {
        if final_flush {
            tracing::info!(moved = self.files_moved, skipped = self.files_skipped, "sync-to-db final tally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_drops_prefix_through_anchor() {
        let rebased = rebase_after_anchor(Path::new("/src/projA/2020/pic.jpg"), "projA").unwrap();
        assert_eq!(rebased, PathBuf::from("2020/pic.jpg"));
    }

    #[test]
    fn rebase_returns_none_without_anchor() {
        assert!(rebase_after_anchor(Path::new("/src/other/pic.jpg"), "projA").is_none());
    }

    #[tokio::test]
    async fn dry_run_does_not_touch_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        let mut serializer = SyncSerializer::new(&dest, true);
        serializer.insert(PathBuf::from("/scan/pic.jpg"), SyncOutcome::Rebased(PathBuf::from("2020/pic.jpg"))).await;
        assert_eq!(serializer.files_moved(), 1);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn real_run_creates_directories_and_copies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pic.jpg");
        std::fs::write(&src, b"bytes").unwrap();
        let dest_root = dir.path().join("dest");

        let mut serializer = SyncSerializer::new(&dest_root, false);
        serializer.insert(src.clone(), SyncOutcome::Rebased(PathBuf::from("2020/pic.jpg"))).await;

        assert_eq!(serializer.files_moved(), 1);
        assert!(dest_root.join("2020/pic.jpg").exists());
    }

    #[tokio::test]
    async fn not_found_increments_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut serializer = SyncSerializer::new(dir.path().join("dest"), false);
        serializer.insert(PathBuf::from("/scan/missing.jpg"), SyncOutcome::NotFound).await;
        assert_eq!(serializer.files_skipped(), 1);
    }
}
