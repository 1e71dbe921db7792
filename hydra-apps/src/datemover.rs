use std::path::{Path, PathBuf};

use hydra_core::timestamp::{mtime_date_key, parse_exif_datetime};
use hydra_engine::capability::{Serializer, WorkerApp};
use hydra_engine::error::WorkError;
use tokio::sync::Mutex;

/// A file's derived destination date key, or an ambiguity the supervisor
/// must resolve interactively (§3, §4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateResult {
    /// Unambiguous `YYYYMMDD`.
    Known(String),
    /// `[from_mtime, other]` — the supervisor's default pick is index 0.
    Ambiguous([String; 2]),
}

impl DateResult {
    pub fn default_choice(&self) -> &str {
        match self {
            DateResult::Known(d) => d,
            DateResult::Ambiguous([from_mtime, _]) => from_mtime,
        }
    }
}

/// `work` hook: EXIF `DateTimeDigitized` when present, else mtime with an
/// ambiguity fallback against `--similar` lookup or this worker's last known
/// EXIF date (§4.8). The "last known EXIF date" is tracked per worker index,
/// since the same [`DateMoverWorker`] instance is shared across the pool.
pub struct DateMoverWorker {
    destination: PathBuf,
    look_for_similar: bool,
    last_exif: Vec<Mutex<Option<String>>>,
}

impl DateMoverWorker {
    pub fn new(destination: impl Into<PathBuf>, look_for_similar: bool, workers: usize) -> Self {
        Self {
            destination: destination.into(),
            look_for_similar,
            last_exif: (0..workers).map(|_| Mutex::new(None)).collect(),
        }
    }
}

impl WorkerApp for DateMoverWorker {
    type Item = PathBuf;
    type Result = DateResult;

    async fn work(&self, worker_index: usize, item: &PathBuf) -> Result<Option<DateResult>, WorkError> {
        let item = item.clone();
        let destination = self.destination.clone();
        let exif = hydra_core::exif::extract(&item).map_err(WorkError::Io)?;

        if let Some(raw) = &exif.date_time_digitized {
            if let Some(dt) = parse_exif_datetime(raw) {
                let date = hydra_core::timestamp::date_key(&dt);
                *self.last_exif[worker_index].lock().await = Some(date.clone());
                return Ok(Some(DateResult::Known(date)));
            }
        }

        let metadata = std::fs::metadata(&item).map_err(WorkError::Io)?;
        let mtime_date = mtime_date_key(&metadata).map_err(WorkError::Io)?;

        if self.look_for_similar {
            if let Some(from_similar) = find_similar_date(&destination, &item) {
                if from_similar == mtime_date {
                    return Ok(Some(DateResult::Known(mtime_date)));
                }
                return Ok(Some(DateResult::Ambiguous([mtime_date, from_similar])));
            }
        }

        let last = self.last_exif[worker_index].lock().await.clone();
        if let Some(last_exif) = last {
            if last_exif == mtime_date {
                return Ok(Some(DateResult::Known(mtime_date)));
            }
            return Ok(Some(DateResult::Ambiguous([mtime_date, last_exif])));
        }

        Ok(Some(DateResult::Known(mtime_date)))
    }
}

/// Looks for `destination/<YYYYMMDD>/<basename-of-item>` across every
/// existing date folder and returns the first `YYYYMMDD` folder name found.
fn find_similar_date(destination: &Path, item: &Path) -> Option<String> {
    let basename = item.file_name()?;
    let entries = std::fs::read_dir(destination).ok()?;
    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        if folder.join(basename).is_file() {
            return folder.file_name().map(|n| n.to_string_lossy().into_owned());
        }
    }
    None
}

/// Librarian-side serializer: accumulates `path -> date` decisions and
/// emits exactly one sorted snapshot on the *final* flush only.
///
/// The original pushes the full mapping on every commit tick, which the
/// supervisor only ever reads once — so an early tick can race later
/// insertions and under-report results. This is a deliberate, documented
/// deviation (see DESIGN.md) that removes the latent race without changing
/// the observable contract: the supervisor still reads exactly one snapshot,
/// now guaranteed complete.
pub struct DateMoverSerializer {
    mapping: Vec<(PathBuf, DateResult)>,
    pending: Vec<Vec<(PathBuf, DateResult)>>,
}

impl Default for DateMoverSerializer {
    fn default() -> Self {
        Self { mapping: Vec::new(), pending: Vec::new() }
    }
}

impl Serializer for DateMoverSerializer {
    type Item = PathBuf;
    type Result = DateResult;
    type MainPayload = Vec<(PathBuf, DateResult)>;

    async fn insert(&mut self, path: PathBuf, result: DateResult) {
        self.mapping.push((path, result));
    }

    async fn commit(&mut self, final_flush: bool) {
        if !final_flush {
            return;
        }
        let mut snapshot = self.mapping.clone();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        self.pending.push(snapshot);
    }

    fn take_main_payloads(&mut self) -> Vec<Vec<(PathBuf, DateResult)>> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_only_emits_on_final_flush() {
        let mut serializer = DateMoverSerializer::default();
        serializer.insert(PathBuf::from("a.jpg"), DateResult::Known("20200704".into())).await;
        serializer.commit(false).await;
        assert!(serializer.take_main_payloads().is_empty());

        serializer.commit(true).await;
        let payloads = serializer.take_main_payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0], vec![(PathBuf::from("a.jpg"), DateResult::Known("20200704".into()))]);
    }

    #[tokio::test]
    async fn worker_falls_back_to_mtime_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.bin");
        std::fs::write(&path, b"data").unwrap();

        let worker = DateMoverWorker::new(dir.path().join("dest"), false, 1);
        let result = worker.work(0, &path).await.unwrap().unwrap();
        assert!(matches!(result, DateResult::Known(_)));
    }
}
