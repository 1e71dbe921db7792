use std::path::PathBuf;
use std::sync::Arc;

use hydra_engine::capability::{ItemSource, Serializer, WorkerApp};
use hydra_engine::counters::Counters;
use hydra_engine::error::{EngineError, WorkError};
use hydra_engine::messages::ItemMsg;
use hydra_engine::queue::QueueSender;
use rusqlite::Connection;
use tokio::sync::Mutex;

/// A source-database row, used as the comparator's `Item` instead of a
/// filesystem path (§3: "one application ... uses a tuple-shaped database row").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub id: i64,
    pub path: String,
    pub hash: String,
    pub size: i64,
    pub date: String,
}

/// Walker override: iterates every row of the source database instead of a
/// filesystem tree, in `path` order for determinism (§4.2's override contract).
pub struct SourceDbWalker {
    source_db: PathBuf,
}

impl SourceDbWalker {
    pub fn new(source_db: impl Into<PathBuf>) -> Self {
        Self { source_db: source_db.into() }
    }
}

impl ItemSource for SourceDbWalker {
    type Item = SourceRow;

    async fn walk(
        &self,
        tx: QueueSender<ItemMsg<SourceRow>>,
        counters: Arc<Counters>,
        workers: usize,
    ) -> Result<(), EngineError> {
        let source_db = self.source_db.clone();
        let rows = tokio::task::spawn_blocking(move || -> rusqlite::Result<Vec<SourceRow>> {
            let conn = Connection::open(&source_db)?;
            let mut stmt = conn.prepare("SELECT id, path, hash, size, date FROM files ORDER BY path")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(SourceRow {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        hash: row.get(2)?,
                        size: row.get(3)?,
                        date: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| EngineError::WalkerFailed(e.to_string()))?
        .map_err(|e| EngineError::WalkerFailed(e.to_string()))?;

        for row in rows {
            counters.incr_indexed();
            tx.put(ItemMsg::Item(row)).await?;
        }

        for _ in 0..workers {
            tx.put(ItemMsg::Nil).await?;
        }
        Ok(())
    }
}

/// `init`/`work` hook: snapshots the target database once per worker, then
/// checks whether each source row's hash is present in it (§4.8).
pub struct ComparatorWorker {
    target_db: PathBuf,
    snapshot: Mutex<Option<Connection>>,
}

impl ComparatorWorker {
    pub fn new(target_db: impl Into<PathBuf>) -> Self {
        Self { target_db: target_db.into(), snapshot: Mutex::new(None) }
    }
}

impl WorkerApp for ComparatorWorker {
    type Item = SourceRow;
    type Result = bool;

    async fn init(&self, _worker_index: usize) -> Result<(), WorkError> {
        let conn = crate::db::snapshot_to_memory(&self.target_db)
            .map_err(|e| WorkError::Other(e.to_string()))?;
        *self.snapshot.lock().await = Some(conn);
        Ok(())
    }

    async fn work(&self, _worker_index: usize, item: &SourceRow) -> Result<Option<bool>, WorkError> {
        let guard = self.snapshot.lock().await;
        let conn = guard.as_ref().ok_or_else(|| WorkError::Other("target snapshot not initialized".into()))?;
        let found: bool = conn
            .query_row("SELECT EXISTS(SELECT 1 FROM files WHERE hash = ?1)", rusqlite::params![item.hash], |r| r.get(0))
            .map_err(|e| WorkError::Other(e.to_string()))?;
        Ok(Some(found))
    }
}

/// Final tally surfaced to the supervisor (§4.7).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparatorSummary {
    pub checked: u64,
    pub missing: u64,
}

/// Librarian-side serializer: logs a warning per miss and reports a final
/// tally on the main-return channel.
#[derive(Default)]
pub struct ComparatorSerializer {
    checked: u64,
    missing: u64,
    pending: Vec<ComparatorSummary>,
}

impl Serializer for ComparatorSerializer {
    type Item = SourceRow;
    type Result = bool;
    type MainPayload = ComparatorSummary;

    async fn insert(&mut self, path: SourceRow, found: bool) {
        self.checked += 1;
        if !found {
            self.missing += 1;
            tracing::warn!(path = %path.path, hash = %path.hash, "row not found in target database");
        }
    }

    async fn commit(&mut self, final_flush: bool) {
        if final_flush {
            self.pending.push(ComparatorSummary { checked: self.checked, missing: self.missing });
        }
    }

    fn take_main_payloads(&mut self) -> Vec<ComparatorSummary> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializer_counts_misses_and_reports_final_tally() {
        let mut serializer = ComparatorSerializer::default();
        serializer
            .insert(
                SourceRow { id: 1, path: "a.jpg".into(), hash: "H1".into(), size: 1, date: "1".into() },
                true,
            )
            .await;
        serializer
            .insert(
                SourceRow { id: 2, path: "b.jpg".into(), hash: "H2".into(), size: 1, date: "1".into() },
                false,
            )
            .await;
        serializer.commit(true).await;

        let payloads = serializer.take_main_payloads();
        assert_eq!(payloads, vec![ComparatorSummary { checked: 2, missing: 1 }]);
    }
}
