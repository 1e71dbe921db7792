use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use hydra_core::fsutil::lacks_duplicate_suffix;
use hydra_core::hash::hash_file;
use hydra_engine::capability::{Serializer, WorkerApp};
use hydra_engine::error::WorkError;

/// `work` hook: the file's content hash, nothing more (§4.8).
pub struct DedupWorker;

impl WorkerApp for DedupWorker {
    type Item = PathBuf;
    type Result = String;

    async fn work(&self, _worker_index: usize, item: &PathBuf) -> Result<Option<String>, WorkError> {
        let item = item.clone();
        let hash = tokio::task::spawn_blocking(move || hash_file(&item))
            .await
            .map_err(|e| WorkError::Other(e.to_string()))?
            .map_err(WorkError::Io)?;
        Ok(Some(hash))
    }
}

/// Librarian-side serializer: maintains the full `path -> hash` mapping and,
/// on every commit, re-derives the duplicate set deterministically by
/// sorting paths and scanning pairwise (§4.8). Re-scanning the whole mapping
/// on every tick is wasteful but idempotent — the `duplicates` set guards
/// against re-emitting a path already flagged.
pub struct DedupSerializer {
    reverse: bool,
    hashes: HashMap<PathBuf, String>,
    duplicates: HashSet<PathBuf>,
    pending: Vec<PathBuf>,
}

impl DedupSerializer {
    pub fn new(reverse: bool) -> Self {
        Self { reverse, hashes: HashMap::new(), duplicates: HashSet::new(), pending: Vec::new() }
    }
}

impl Serializer for DedupSerializer {
    type Item = PathBuf;
    type Result = String;
    type MainPayload = PathBuf;

    async fn insert(&mut self, path: PathBuf, result: String) {
        self.hashes.insert(path, result);
    }

    async fn commit(&mut self, _final_flush: bool) {
        let mut paths: Vec<PathBuf> = self.hashes.keys().cloned().collect();
        paths.sort();
        if self.reverse {
            paths.reverse();
        }

        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                if self.duplicates.contains(&paths[j]) {
                    continue;
                }
                if self.hashes[&paths[i]] == self.hashes[&paths[j]] {
                    self.duplicates.insert(paths[j].clone());
                    self.pending.push(paths[j].clone());
                }
            }
        }
    }

    fn take_main_payloads(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending)
    }
}

/// Counts duplicate paths whose basename doesn't look like a deliberate
/// extra copy (§4.8's warning heuristic). A non-zero count means batch mode
/// must refuse to delete.
pub fn count_warnings(duplicates: &HashSet<PathBuf>) -> usize {
    duplicates
        .iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(lacks_duplicate_suffix)
                .unwrap_or(true)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(serializer: &mut DedupSerializer, entries: &[(&str, &str)]) {
        for (path, hash) in entries {
            serializer.insert(PathBuf::from(path), hash.to_string()).await;
        }
    }

    #[tokio::test]
    async fn flags_later_duplicates_by_sorted_path_order() {
        let mut serializer = DedupSerializer::new(false);
        seed(&mut serializer, &[("x.jpg", "H"), ("x_1.jpg", "H"), ("x_2.jpg", "H")]).await;
        serializer.commit(false).await;

        let dups: HashSet<PathBuf> = serializer.take_main_payloads().into_iter().collect();
        assert_eq!(dups, HashSet::from([PathBuf::from("x_1.jpg"), PathBuf::from("x_2.jpg")]));
        assert_eq!(count_warnings(&dups), 0);
    }

    #[tokio::test]
    async fn warns_on_duplicate_without_suffix_convention() {
        let mut serializer = DedupSerializer::new(false);
        seed(&mut serializer, &[("a.bin", "H"), ("b.bin", "H")]).await;
        serializer.commit(false).await;

        let dups: HashSet<PathBuf> = serializer.take_main_payloads().into_iter().collect();
        assert_eq!(dups, HashSet::from([PathBuf::from("b.bin")]));
        assert_eq!(count_warnings(&dups), 1);
    }

    #[tokio::test]
    async fn does_not_re_emit_across_commits() {
        let mut serializer = DedupSerializer::new(false);
        seed(&mut serializer, &[("a.jpg", "H"), ("a_1.jpg", "H")]).await;
        serializer.commit(false).await;
        let first = serializer.take_main_payloads();
        assert_eq!(first.len(), 1);

        serializer.commit(false).await;
        let second = serializer.take_main_payloads();
        assert!(second.is_empty());
    }
}
