use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free progress counters shared across every stage.
///
/// Every read is lossy by design: nothing but the status display consumes
/// these values, so `Ordering::Relaxed` is sufficient everywhere.
pub struct Counters {
    indexed: AtomicU64,
    skipped: AtomicU64,
    logged: AtomicU64,
    processed: Vec<AtomicU64>,
}

impl Counters {
    pub fn new(workers: usize) -> Self {
        Self {
            indexed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            logged: AtomicU64::new(0),
            processed: (0..workers).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn incr_indexed(&self) {
        self.indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_logged(&self) {
        self.logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_processed(&self, worker_index: usize) {
        self.processed[worker_index].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            indexed: self.indexed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            logged: self.logged.load(Ordering::Relaxed),
            processed: self.processed.iter().map(|c| c.load(Ordering::Relaxed)).collect(),
        }
    }
}

/// Point-in-time, possibly-stale read of [`Counters`] for display purposes.
#[derive(Debug, Clone)]
pub struct CountersSnapshot {
    pub indexed: u64,
    pub skipped: u64,
    pub logged: u64,
    pub processed: Vec<u64>,
}

impl CountersSnapshot {
    /// One carriage-return-terminated status line, as rendered by the supervisor.
    pub fn status_line(&self) -> String {
        let processed_sum: u64 = self.processed.iter().sum();
        format!(
            "\rindexed={} skipped={} processed={} logged={}",
            self.indexed, self.skipped, processed_sum, self.logged
        )
    }
}
