use std::time::Duration;

/// Tunables for one engine run: queue capacities, worker count, and the two
/// timers (commit ticker, status redraw). Every field has a named default
/// and is overridable from the CLI layer via `clap(env = "...")`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub commit_interval: Duration,
    pub status_interval: Duration,
}

impl EngineConfig {
    pub const DEFAULT_WORKERS: usize = 4;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 2048;
    pub const DEFAULT_COMMIT_INTERVAL_SECS: u64 = 5;
    pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 1;

    pub fn new(workers: usize) -> Self {
        Self { workers, ..Self::default() }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: Self::DEFAULT_WORKERS,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            commit_interval: Duration::from_secs(Self::DEFAULT_COMMIT_INTERVAL_SECS),
            status_interval: Duration::from_secs(Self::DEFAULT_STATUS_INTERVAL_SECS),
        }
    }
}
