use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::capability::ItemSource;
use crate::counters::Counters;
use crate::error::EngineError;
use crate::messages::ItemMsg;
use crate::queue::QueueSender;

/// Default filesystem producer: enumerates `root` depth-first, entries
/// sorted within each directory, skipping anything that is not a regular
/// non-empty file.
pub struct FsWalker {
    root: PathBuf,
}

impl FsWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ItemSource for FsWalker {
    type Item = PathBuf;

    async fn walk(
        &self,
        tx: QueueSender<ItemMsg<PathBuf>>,
        counters: Arc<Counters>,
        workers: usize,
    ) -> Result<(), EngineError> {
        walk_sorted(&self.root, &tx, &counters).await?;

        for _ in 0..workers {
            tx.put(ItemMsg::Nil).await?;
        }
        Ok(())
    }
}

async fn walk_sorted(
    root: &Path,
    tx: &QueueSender<ItemMsg<PathBuf>>,
    counters: &Counters,
) -> Result<(), EngineError> {
    let walker = WalkDir::new(root).sort_by_file_name().into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "walk entry failed, skipping");
                counters.incr_skipped();
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "stat failed, skipping");
                counters.incr_skipped();
                continue;
            }
        };

        if !meta.is_file() || meta.len() == 0 {
            counters.incr_skipped();
            continue;
        }

        counters.incr_indexed();
        tx.put(ItemMsg::Item(entry.into_path())).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::bounded;
    use std::io::Write;

    #[tokio::test]
    async fn skips_empty_files_and_emits_nil_per_worker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        {
            let mut f = std::fs::File::create(dir.path().join("empty.txt")).unwrap();
            f.write_all(b"").unwrap();
        }

        let (tx, rx) = bounded::<ItemMsg<PathBuf>>(16);
        let counters = Arc::new(Counters::new(2));
        let walker = FsWalker::new(dir.path());
        walker.walk(tx, counters.clone(), 2).await.unwrap();

        let mut items = Vec::new();
        let mut nils = 0;
        while let Some(msg) = rx.get().await {
            match msg {
                ItemMsg::Item(p) => items.push(p),
                ItemMsg::Nil => {
                    nils += 1;
                    if nils == 2 {
                        break;
                    }
                }
            }
        }

        assert_eq!(items.len(), 1);
        assert_eq!(nils, 2);
        assert_eq!(counters.snapshot().indexed, 1);
        assert_eq!(counters.snapshot().skipped, 1);
    }
}
