use thiserror::Error;

/// Error raised by an application's `work` hook for a single item.
///
/// Classification decides whether the worker loop logs and skips the item
/// (everything here) or aborts the run (engine-level [`EngineError`]).
#[derive(Debug, Error)]
pub enum WorkError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not a regular file: {0}")]
    NotRegular(String),
    #[error("empty file: {0}")]
    Empty(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl WorkError {
    /// True for conditions the walker/worker treat as a silent skip rather
    /// than a logged warning (zero-size, non-regular entries).
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            WorkError::NotFound(_)
                | WorkError::PermissionDenied(_)
                | WorkError::NotRegular(_)
                | WorkError::Empty(_)
        )
    }
}

/// Fatal engine-level error: these abort the whole run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("channel closed unexpectedly")]
    ChannelClosed,
    #[error("walker task failed: {0}")]
    WalkerFailed(String),
    #[error("worker {index} failed to initialize: {source}")]
    WorkerInitFailed { index: usize, source: WorkError },
    #[error("librarian task failed: {0}")]
    LibrarianFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
