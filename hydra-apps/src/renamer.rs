use std::path::PathBuf;

use hydra_core::timestamp::{parse_exif_datetime, time_key, RENAME_FALLBACK_STEM};
use hydra_engine::capability::{Serializer, WorkerApp};
use hydra_engine::error::WorkError;

/// `work` hook: `HHMMSS.ext` derived from EXIF `DateTimeDigitized`'s
/// time-of-day component, or `000000.ext` on failure (§4.8).
pub struct RenamerWorker;

impl WorkerApp for RenamerWorker {
    type Item = PathBuf;
    type Result = String;

    async fn work(&self, _worker_index: usize, item: &PathBuf) -> Result<Option<String>, WorkError> {
        let ext = item.extension().and_then(|e| e.to_str()).unwrap_or("");
        let exif = hydra_core::exif::extract(item).map_err(WorkError::Io)?;

        let stem = exif
            .date_time_digitized
            .as_deref()
            .and_then(parse_exif_datetime)
            .map(|dt| time_key(&dt))
            .unwrap_or_else(|| RENAME_FALLBACK_STEM.to_string());

        let new_name = if ext.is_empty() { stem } else { format!("{stem}.{ext}") };
        Ok(Some(new_name))
    }
}

/// Librarian-side serializer: accumulates `path -> proposed name` pairs and
/// emits exactly one path-sorted snapshot on the final flush (same rationale
/// as [`crate::datemover::DateMoverSerializer`]).
#[derive(Default)]
pub struct RenamerSerializer {
    mapping: Vec<(PathBuf, String)>,
    pending: Vec<Vec<(PathBuf, String)>>,
}

impl Serializer for RenamerSerializer {
    type Item = PathBuf;
    type Result = String;
    type MainPayload = Vec<(PathBuf, String)>;

    async fn insert(&mut self, path: PathBuf, result: String) {
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

    fn take_main_payloads(&mut self) -> Vec<Vec<(PathBuf, String)>> {
        std::mem::take(&mut self.pending)
    }
}

/// True when a proposed rename is the `000000` fallback stem (§4.8: these
/// are excluded from the final rename batch, with a warning logged).
pub fn is_fallback_name(new_name: &str) -> bool {
    new_name == RENAME_FALLBACK_STEM
        || new_name.starts_with(&format!("{RENAME_FALLBACK_STEM}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_sentinel_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"data").unwrap();

        let worker = RenamerWorker;
        let name = worker.work(0, &path).await.unwrap().unwrap();
        assert_eq!(name, "000000.jpg");
        assert!(is_fallback_name(&name));
    }

    #[tokio::test]
    async fn final_flush_sorts_by_path() {
        let mut serializer = RenamerSerializer::default();
        serializer.insert(PathBuf::from("b.jpg"), "100000.jpg".into()).await;
        serializer.insert(PathBuf::from("a.jpg"), "090000.jpg".into()).await;
        serializer.commit(true).await;

        let payloads = serializer.take_main_payloads();
        assert_eq!(
            payloads[0],
            vec![
                (PathBuf::from("a.jpg"), "090000.jpg".to_string()),
                (PathBuf::from("b.jpg"), "100000.jpg".to_string()),
            ]
        );
    }
}
